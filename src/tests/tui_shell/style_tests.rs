use super::*;

#[test]
fn diff_lines_are_colored_by_leading_marker() {
    assert_eq!(diff_line_style("+listen 443;").fg, Some(Color::Green));
    assert_eq!(diff_line_style("-listen 80;").fg, Some(Color::Red));
    assert_eq!(diff_line_style("@@ -1,3 +1,3 @@").fg, Some(Color::Cyan));
    assert_eq!(diff_line_style(" server {").fg, None);
    assert_eq!(diff_line_style("+++ b/nginx.conf").fg, Some(Color::Gray));
    assert_eq!(diff_line_style("--- a/nginx.conf").fg, Some(Color::Gray));
}

#[test]
fn marker_colors_follow_the_status_table() {
    let colors: Vec<Color> = crate::model::STATUS_MARKERS
        .iter()
        .map(|(_, m)| marker_color(m.color))
        .collect();
    assert_eq!(colors, vec![Color::Yellow, Color::Green, Color::Red]);
}
