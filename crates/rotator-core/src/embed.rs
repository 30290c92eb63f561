//! Player embed addresses.  The viewport is given a channel, the mute flag and
//! the deployment host, nothing else.

use url::Url;

pub const PLAYER_BASE: &str = "https://player.twitch.tv/";

pub fn player_url(channel: &str, muted: bool, parent_host: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        PLAYER_BASE,
        &[
            ("channel", channel),
            ("parent", parent_host),
            ("muted", if muted { "true" } else { "false" }),
            ("autoplay", "true"),
        ],
    )
}
