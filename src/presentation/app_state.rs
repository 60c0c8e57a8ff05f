// Application state for HTTP handlers
use crate::application::goal_service::GoalService;

#[derive(Clone)]
pub struct AppState {
    pub goal_service: GoalService,
}
