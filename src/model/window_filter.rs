use crate::common::config::{SpacesToShow, TaskbarSettings};
use crate::sys::screen::{DisplayUuid, SpaceSnapshot};
use crate::sys::window_server::Window;

/// Windows that belong on `display`'s panel, in the registry's order.
pub fn select_windows_for_panel<'a>(
    display: &DisplayUuid,
    windows: &'a [Window],
    spaces: &SpaceSnapshot,
    settings: &TaskbarSettings,
) -> Vec<&'a Window> {
    let visible_spaces = spaces.visible_spaces_for(display);

    windows
        .iter()
        .filter(|window| {
            if window.is_windowless() || !window.is_on_display(display) {
                return false;
            }
            if settings.spaces_to_show == SpacesToShow::Visible
                && !window.spaces.iter().any(|space| visible_spaces.contains(space))
            {
                return false;
            }
            if settings.show_minimized_windows.hides() && window.is_minimized() {
                return false;
            }
            if settings.show_hidden_windows.hides() && window.is_hidden() {
                return false;
            }
            if settings.show_fullscreen_windows.hides() && window.is_fullscreen() {
                return false;
            }
            true
        })
        .collect()
}

/// True if a real (non-windowless) window on `display` is in native
/// fullscreen. Such a display shows no taskbar at all.
pub fn has_fullscreen_window(display: &DisplayUuid, windows: &[Window]) -> bool {
    windows
        .iter()
        .any(|w| !w.is_windowless() && w.is_on_display(display) && w.is_fullscreen())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::common::collections::{HashMap, HashSet};
    use crate::common::config::ShowWindows;
    use crate::sys::screen::SpaceId;
    use crate::sys::window_server::{WindowFlags, WindowId};

    fn main_display() -> DisplayUuid { "main".into() }

    fn snapshot() -> SpaceSnapshot {
        let mut by_display = HashMap::default();
        by_display.insert(
            main_display(),
            [SpaceId::new(1), SpaceId::new(2)].into_iter().collect::<HashSet<_>>(),
        );
        by_display.insert(
            DisplayUuid::from("side"),
            [SpaceId::new(3)].into_iter().collect::<HashSet<_>>(),
        );
        let visible = [SpaceId::new(1), SpaceId::new(3)].into_iter().collect();
        SpaceSnapshot::new(by_display, visible)
    }

    fn window(id: u32) -> Window {
        Window {
            id: WindowId::new(id),
            display: Some(main_display()),
            spaces: vec![SpaceId::new(1)],
            flags: WindowFlags::empty(),
            position: None,
            size: None,
            handle: None,
        }
    }

    fn with_flags(id: u32, flags: WindowFlags) -> Window {
        Window { flags, ..window(id) }
    }

    fn selected(windows: &[Window], settings: &TaskbarSettings) -> Vec<u32> {
        select_windows_for_panel(&main_display(), windows, &snapshot(), settings)
            .into_iter()
            .map(|w| w.id.as_u32())
            .collect()
    }

    #[test]
    fn plain_window_is_listed() {
        assert_eq!(selected(&[window(1)], &TaskbarSettings::default()), vec![1]);
    }

    #[test]
    fn windowless_apps_are_never_listed() {
        let windows = [with_flags(1, WindowFlags::WINDOWLESS)];
        let settings = TaskbarSettings {
            spaces_to_show: SpacesToShow::All,
            ..Default::default()
        };
        assert_eq!(selected(&windows, &settings), Vec::<u32>::new());
    }

    #[test]
    fn windows_on_other_displays_are_excluded() {
        let windows = [
            Window { display: Some("side".into()), ..window(1) },
            Window { display: None, ..window(2) },
            window(3),
        ];
        assert_eq!(selected(&windows, &TaskbarSettings::default()), vec![3]);
    }

    #[test]
    fn visible_mode_requires_a_visible_space_on_this_display() {
        let windows = [
            Window { spaces: vec![SpaceId::new(2)], ..window(1) },
            // Visible globally, but hosted by another display.
            Window { spaces: vec![SpaceId::new(3)], ..window(2) },
            Window { spaces: vec![SpaceId::new(2), SpaceId::new(1)], ..window(3) },
            Window { spaces: vec![], ..window(4) },
        ];
        assert_eq!(selected(&windows, &TaskbarSettings::default()), vec![3]);

        let all = TaskbarSettings {
            spaces_to_show: SpacesToShow::All,
            ..Default::default()
        };
        assert_eq!(selected(&windows, &all), vec![1, 2, 3, 4]);
    }

    #[test]
    fn minimized_toggle() {
        let windows = [with_flags(1, WindowFlags::MINIMIZED), window(2)];
        assert_eq!(selected(&windows, &TaskbarSettings::default()), vec![1, 2]);
        let hide = TaskbarSettings {
            show_minimized_windows: ShowWindows::Hide,
            ..Default::default()
        };
        assert_eq!(selected(&windows, &hide), vec![2]);
    }

    #[test]
    fn hidden_toggle() {
        let windows = [with_flags(1, WindowFlags::HIDDEN), window(2)];
        assert_eq!(selected(&windows, &TaskbarSettings::default()), vec![1, 2]);
        let hide = TaskbarSettings {
            show_hidden_windows: ShowWindows::Hide,
            ..Default::default()
        };
        assert_eq!(selected(&windows, &hide), vec![2]);
    }

    #[test]
    fn fullscreen_toggle() {
        let windows = [with_flags(1, WindowFlags::FULLSCREEN), window(2)];
        assert_eq!(selected(&windows, &TaskbarSettings::default()), vec![1, 2]);
        let hide = TaskbarSettings {
            show_fullscreen_windows: ShowWindows::Hide,
            ..Default::default()
        };
        assert_eq!(selected(&windows, &hide), vec![2]);
    }

    #[test]
    fn toggles_only_affect_their_own_flag() {
        let windows = [
            with_flags(1, WindowFlags::MINIMIZED),
            with_flags(2, WindowFlags::HIDDEN),
            with_flags(3, WindowFlags::FULLSCREEN),
        ];
        let hide_minimized = TaskbarSettings {
            show_minimized_windows: ShowWindows::Hide,
            ..Default::default()
        };
        assert_eq!(selected(&windows, &hide_minimized), vec![2, 3]);
    }

    #[test]
    fn preserves_registry_order() {
        let windows = [window(9), window(2), window(5)];
        assert_eq!(selected(&windows, &TaskbarSettings::default()), vec![9, 2, 5]);
    }

    #[test]
    fn fullscreen_detection_ignores_windowless_and_other_displays() {
        let display = main_display();
        assert!(!has_fullscreen_window(&display, &[window(1)]));
        assert!(!has_fullscreen_window(
            &display,
            &[with_flags(1, WindowFlags::FULLSCREEN | WindowFlags::WINDOWLESS)]
        ));
        assert!(!has_fullscreen_window(
            &display,
            &[Window {
                display: Some("side".into()),
                ..with_flags(1, WindowFlags::FULLSCREEN)
            }]
        ));
        assert!(has_fullscreen_window(
            &display,
            &[window(1), with_flags(2, WindowFlags::FULLSCREEN)]
        ));
    }
}
