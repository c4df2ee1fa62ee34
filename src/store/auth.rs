use crate::domain::user::Session;
use crate::store::action::Action;

#[derive(Debug, Clone, Default)]
pub struct AuthSlice {
    pub status: bool,
    pub session: Option<Session>,
}

pub(crate) fn reduce(slice: &mut AuthSlice, action: &Action) {
    match action {
        Action::Login { session } => {
            slice.status = true;
            slice.session = Some(session.clone());
        }
        Action::Logout => *slice = AuthSlice::default(),
        _ => {}
    }
}
