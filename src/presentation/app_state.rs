// Application state for HTTP handlers
use crate::application::auth_service::AuthService;
use crate::application::device_service::DeviceService;
use crate::application::export_service::ExportService;
use crate::application::graph_service::GraphService;

#[derive(Clone)]
pub struct AppState {
    pub device_service: DeviceService,
    pub graph_service: GraphService,
    pub export_service: ExportService,
    pub auth_service: AuthService,
}
