use earth_news::ui::tui::footer_legend;

#[test]
fn footer_legend_toggles_help() {
    let hidden = footer_legend(false);
    assert!(
        hidden.contains("F1 help"),
        "hidden footer should show F1 help"
    );
    assert!(
        hidden.contains("/ search"),
        "hidden footer should show / search"
    );
    assert!(
        hidden.contains("Esc/F10 quit"),
        "hidden footer should show Esc/F10 quit"
    );

    let shown = footer_legend(true);
    assert!(
        shown.contains("Esc/F10 quit"),
        "shown footer should show Esc/F10 quit"
    );
    assert!(
        shown.contains("o read"),
        "shown footer should mention the read-whole key"
    );
    assert!(!shown.contains("F1 help"));
}
