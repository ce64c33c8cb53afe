use anyhow::Result;

/// Runtime for driving [SignalModule](crate::widget::signals::SignalModule) on the host's event
/// thread.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
