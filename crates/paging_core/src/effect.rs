/// Engine operation requested by the presentation adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Refresh,
    Append,
}
