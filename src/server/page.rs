use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::chatbot::CredentialStatus;

pub const PAGE_TITLE: &str = "Chatbot with LangChain";

/// Everything the question page shows for one render.
#[derive(Debug, Clone, Default)]
pub struct PageView<'a> {
    pub credential: Option<CredentialStatus>,
    pub question: &'a str,
    /// Pretty-printed agent response.
    pub response: Option<String>,
    pub error: Option<String>,
}

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; max-width: 46rem; margin: 3rem auto; padding: 0 1rem; color: #262730; }
.banner { padding: .75rem 1rem; border-radius: .5rem; margin: 1rem 0; }
.success { background: #e8f9ee; color: #177233; }
.error { background: #ffeceb; color: #7d1a1a; }
label { display: block; margin: 1rem 0 .25rem; }
input[type=text] { width: 100%; box-sizing: border-box; padding: .5rem; font-size: 1rem; }
pre { background: #f0f2f6; padding: 1rem; border-radius: .5rem; white-space: pre-wrap; word-break: break-word; }
#thinking { display: none; color: #555; }
"#;

const SCRIPT: &str = r#"
document.getElementById("ask").addEventListener("submit", function () {
  document.getElementById("thinking").style.display = "block";
});
"#;

pub fn render_page(view: &PageView<'_>) -> String {
    let mut body = String::new();
    body.push_str(&format!("<h1>{}</h1>\n", encode_text(PAGE_TITLE)));

    match view.credential {
        Some(status @ CredentialStatus::Loaded) => body.push_str(&format!(
            "<div class=\"banner success\">{}</div>\n",
            encode_text(status.message())
        )),
        Some(status @ CredentialStatus::Missing) => body.push_str(&format!(
            "<div class=\"banner error\">{}</div>\n",
            encode_text(status.message())
        )),
        None => {}
    }

    body.push_str("<p>Ask me anything!</p>\n");
    body.push_str(&format!(
        concat!(
            "<form id=\"ask\" method=\"post\" action=\"/\">\n",
            "<label for=\"question\">Your question:</label>\n",
            "<input type=\"text\" id=\"question\" name=\"question\" value=\"{}\" autofocus>\n",
            "</form>\n",
        ),
        encode_double_quoted_attribute(view.question)
    ));
    body.push_str("<p id=\"thinking\">Thinking...</p>\n");

    if let Some(error) = &view.error {
        body.push_str(&format!(
            "<div class=\"banner error\">{}</div>\n",
            encode_text(error)
        ));
    }
    if let Some(response) = &view.response {
        body.push_str(&format!(
            "<pre id=\"response\">{}</pre>\n",
            encode_text(response)
        ));
    }

    format!(
        concat!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n",
            "<meta charset=\"utf-8\">\n",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
            "<title>{title}</title>\n",
            "<link rel=\"icon\" href=\"data:image/svg+xml,<svg xmlns=%22http://www.w3.org/2000/svg%22 viewBox=%220 0 100 100%22><text y=%22.9em%22 font-size=%2290%22>🤖</text></svg>\">\n",
            "<style>{style}</style>\n",
            "</head>\n<body>\n{body}<script>{script}</script>\n</body>\n</html>\n",
        ),
        title = encode_text(PAGE_TITLE),
        style = STYLE,
        body = body,
        script = SCRIPT,
    )
}
