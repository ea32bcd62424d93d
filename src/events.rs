use crate::sys::engine::EngineStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Progress { position: u32, duration: u32 },
    EngineStatus(EngineStatus),
    ConfigReload,
}
