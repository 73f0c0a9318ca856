/// Cosine similarity of two vectors, in `[-1, 1]`.
///
/// Mismatched lengths and zero vectors score `0.0`.
///
/// ```rust
/// use langchain_chatbot::utils::cosine_similarity_f64;
///
/// let similarity = cosine_similarity_f64(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
/// assert!((similarity - 1.0).abs() < 1e-10);
/// ```
pub fn cosine_similarity_f64(vec1: &[f64], vec2: &[f64]) -> f64 {
    if vec1.len() != vec2.len() {
        return 0.0;
    }

    let dot_product: f64 = vec1.iter().zip(vec2.iter()).map(|(a, b)| a * b).sum();
    let magnitude_vec1: f64 = vec1.iter().map(|x| x.powi(2)).sum::<f64>().sqrt();
    let magnitude_vec2: f64 = vec2.iter().map(|x| x.powi(2)).sum::<f64>().sqrt();

    if magnitude_vec1 == 0.0 || magnitude_vec2 == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_vec1 * magnitude_vec2)
}
