//! Content addressing command handler.

use marquee::{MarqueeConfig, MarqueeResult, address_source};

/// Print the content identifier of `path` on the configured byte source.
pub async fn address_file(config: &MarqueeConfig, path: &str) -> MarqueeResult<()> {
    let source = config.source.build()?;
    let content_id = address_source(source.as_ref(), path).await?;
    println!("{content_id}");
    Ok(())
}
