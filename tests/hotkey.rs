use stagehand::hotkey::{parse_hotkey, Command, HotkeyDispatcher, HotkeyHandler, Key};
use stagehand::settings::Settings;
use std::sync::mpsc;

#[test]
fn parse_simple_f_key() {
    let hk = parse_hotkey("F2").expect("should parse F2");
    assert_eq!(hk.key, Key::F(2));
    assert!(!hk.ctrl && !hk.shift && !hk.alt && !hk.cmd);
}

#[test]
fn parse_combo_hotkey() {
    let hk = parse_hotkey("Ctrl+Shift+Space").expect("should parse combination");
    assert_eq!(hk.key, Key::Space);
    assert!(hk.ctrl && hk.shift && !hk.alt);
}

#[test]
fn parse_digit_and_escape() {
    let hk = parse_hotkey("ctrl + 3").expect("spaces and case are ignored");
    assert_eq!(hk.key, Key::Digit(3));
    assert!(hk.ctrl);
    assert_eq!(parse_hotkey("Esc"), parse_hotkey("Escape"));
}

#[test]
fn parse_invalid_hotkey() {
    assert!(parse_hotkey("Ctrl+Foo").is_none());
    assert!(parse_hotkey("Ctrl+Shift").is_none());
    assert!(parse_hotkey("").is_none());
}

#[test]
fn default_bindings_route_to_commands() {
    let (tx, rx) = mpsc::channel();
    let dispatcher = HotkeyDispatcher::from_settings(&Settings::default(), tx);

    let expected = [
        ("Ctrl+1", Command::ToggleDraw),
        ("Ctrl+2", Command::ToggleTimer),
        ("Ctrl+3", Command::DemoType),
        ("Escape", Command::Cancel),
    ];
    for (text, command) in expected {
        let id = dispatcher
            .resolve(&parse_hotkey(text).unwrap())
            .unwrap_or_else(|| panic!("{text} is not bound"));
        dispatcher.hotkey_fired(id);
        assert_eq!(rx.try_recv(), Ok(command), "{text}");
    }
    assert_eq!(dispatcher.resolve(&parse_hotkey("Ctrl+9").unwrap()), None);
}

#[test]
fn rebinding_replaces_the_previous_command() {
    let (tx, rx) = mpsc::channel();
    let mut dispatcher = HotkeyDispatcher::new(tx);
    dispatcher.bind(7, parse_hotkey("F7").unwrap(), Command::ToggleDraw);
    dispatcher.bind(7, parse_hotkey("F8").unwrap(), Command::ToggleTimer);
    assert_eq!(dispatcher.bindings().count(), 1);

    dispatcher.hotkey_fired(7);
    assert_eq!(rx.try_recv(), Ok(Command::ToggleTimer));

    assert_eq!(dispatcher.unbind(7), Some(Command::ToggleTimer));
    dispatcher.hotkey_fired(7);
    assert!(rx.try_recv().is_err());
}
