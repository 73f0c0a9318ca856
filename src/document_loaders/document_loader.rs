use std::pin::Pin;

use async_stream::stream;
use async_trait::async_trait;
use futures::{pin_mut, Stream, StreamExt};

use super::LoaderError;
use crate::{schemas::Document, text_splitter::TextSplitter};

pub type DocumentStream = Pin<Box<dyn Stream<Item = Result<Document, LoaderError>> + Send + 'static>>;

#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(self) -> Result<DocumentStream, LoaderError>;

    async fn load_and_split<TS: TextSplitter + 'static>(
        self,
        splitter: TS,
    ) -> Result<DocumentStream, LoaderError>;
}

/// Re-emits each loaded document as the chunks `splitter` cuts it into.
pub(crate) async fn process_doc_stream<TS: TextSplitter + 'static>(
    doc_stream: DocumentStream,
    splitter: TS,
) -> impl Stream<Item = Result<Document, LoaderError>> {
    stream! {
        pin_mut!(doc_stream);
        while let Some(doc_result) = doc_stream.next().await {
            match doc_result {
                Ok(doc) => match splitter.split_documents(&[doc]).await {
                    Ok(chunks) => {
                        for chunk in chunks {
                            yield Ok(chunk);
                        }
                    }
                    Err(e) => yield Err(LoaderError::TextSplitterError(e)),
                },
                Err(e) => yield Err(e),
            }
        }
    }
}
