//! The single player slot.  Holds whatever channel was last loaded and the
//! embed address a browser-side player would be pointed at.

use tracing::{info, warn};

use rotator_core::embed::player_url;

#[derive(Debug, Default)]
pub struct Viewport {
    channel: Option<String>,
    muted: bool,
    url: Option<String>,
}

impl Viewport {
    pub fn load(&mut self, channel: &str, muted: bool, parent_host: &str) {
        self.url = match player_url(channel, muted, parent_host) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                warn!("viewport: cannot build player address for {}: {}", channel, e);
                None
            }
        };
        self.channel = Some(channel.to_string());
        self.muted = muted;
        info!(
            "viewport: loading {} ({})",
            channel,
            if muted { "muted" } else { "sound on" }
        );
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_records_channel_and_address() {
        let mut viewport = Viewport::default();
        viewport.load("PointCrow", true, "localhost");
        assert_eq!(viewport.channel(), Some("PointCrow"));
        assert!(viewport.muted());
        assert_eq!(
            viewport.url(),
            Some("https://player.twitch.tv/?channel=PointCrow&parent=localhost&muted=true&autoplay=true")
        );
    }
}
