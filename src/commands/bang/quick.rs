//! Quick commands: !ping, vox

use rand::seq::IndexedRandom;

pub const VOX: &str = "vox";

pub const VOX_RESPONSES: [&str; 3] = [
    "Bro is busy playing video game, WoW",
    "Probably smoking somewhere",
    "He is trashtalking, will reply to you soon",
];

/// Generate ping announcement
pub fn ping() -> String {
    "🏓 Pong! This is the announcement channel.".to_string()
}

/// Pick one of the vox lines uniformly at random
pub fn vox() -> String {
    VOX_RESPONSES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(VOX_RESPONSES[0])
        .to_string()
}
