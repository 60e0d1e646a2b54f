/// Which screen/interaction is active. Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Title,
    Idle,
    PlayingPreview,
    EnteringMovieName,
    PlayingMovie,
}
