pub mod mock_ws;

use std::future::Future;
use std::time::Duration;

/// Poll `condition` every 20ms until it holds or `limit` elapses.
pub async fn wait_until<F, Fut>(limit: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(limit, async {
        loop {
            if condition().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .is_ok()
}

/// Deriv `tick` frame.
pub fn tick_frame(symbol: &str, quote: &str, epoch: i64) -> String {
    format!(
        r#"{{"echo_req":{{"ticks":"{symbol}","subscribe":1}},"msg_type":"tick","tick":{{"ask":{quote},"bid":{quote},"epoch":{epoch},"id":"mock","pip_size":2,"quote":{quote},"symbol":"{symbol}"}}}}"#
    )
}
