use staffdata_db::DbPool;

/// Handed to every handler through `State<AppState>`. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
}
