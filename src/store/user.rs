use crate::domain::user::UserProfile;
use crate::store::action::Action;

#[derive(Debug, Clone, Default)]
pub struct UserSlice {
    pub profile: Option<UserProfile>,
}

pub(crate) fn reduce(slice: &mut UserSlice, action: &Action) {
    match action {
        Action::SetUserData { profile } => slice.profile = Some(profile.clone()),
        Action::Logout => slice.profile = None,
        _ => {}
    }
}
