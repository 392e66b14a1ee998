use crate::handlers::Message;
use aep_notification_util::{ImageSource, fetch_images};
use std::sync::Arc;
use tokio::sync::mpsc;
use url::Url;

/// Download a batch in the background and post the results tagged with `generation`.
pub fn spawn_fetch<S>(
    source: Arc<S>,
    urls: Vec<Url>,
    max_size: u32,
    generation: u64,
    tx: mpsc::Sender<Message>,
) where
    S: ImageSource + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let results = fetch_images(source.as_ref(), urls.iter().map(Url::as_str), max_size).await;
        tracing::debug!("Image batch {} finished with {} result(s)", generation, results.len());
        if tx
            .send(Message::ImagesLoaded { generation, results })
            .await
            .is_err()
        {
            tracing::debug!("Controller gone, dropping image batch {}", generation);
        }
    });
}
