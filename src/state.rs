use crate::{db::OrmConn, mailer::Mailer};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub mailer: Mailer,
}
