/// Structured events published by a bridge supervisor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// The bridge reported a new resampling delay, in frames
    DelayChanged(String),
    /// Any other non-blank output line from the bridge
    LogMessage(String),
}
