use super::*;

#[test]
fn recording_navigator_keeps_order() {
    let nav = RecordingNavigator::new();
    assert_eq!(nav.last(), None);
    nav.navigate(DASHBOARD_ROUTE);
    nav.navigate(LOGIN_ROUTE);
    assert_eq!(nav.routes(), ["/dashboard", "/login"]);
    assert_eq!(nav.last().as_deref(), Some("/login"));
}

#[test]
fn navigators_are_usable_as_trait_objects() {
    let navs: [Box<dyn Navigator>; 2] = [Box::new(LogNavigator), Box::new(RecordingNavigator::new())];
    for nav in &navs {
        nav.navigate(DASHBOARD_ROUTE);
    }
}
