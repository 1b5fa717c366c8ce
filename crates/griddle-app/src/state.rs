// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Edit,
    Manage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub theme: Theme,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            theme: Theme::Light,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    EnterEditMode,
    ExitToNav,
    OpenManager,
    CloseManager,
    ToggleTheme,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    ThemeChanged(Theme),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::EnterEditMode => {
                self.mode = AppMode::Edit;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ExitToNav => {
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(self.mode), self.set_status("nav")]
            }
            AppCommand::OpenManager => {
                self.mode = AppMode::Manage;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::CloseManager => {
                self.mode = AppMode::Nav;
                vec![
                    AppEvent::ModeChanged(self.mode),
                    self.set_status("columns closed"),
                ]
            }
            AppCommand::ToggleTheme => {
                self.theme = self.theme.toggled();
                vec![
                    AppEvent::ThemeChanged(self.theme),
                    self.set_status(self.theme.as_str()),
                ]
            }
            AppCommand::SetStatus(message) => {
                self.status_line = Some(message.clone());
                vec![AppEvent::StatusUpdated(message)]
            }
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppMode, AppState};
    use crate::model::Theme;

    #[test]
    fn mode_transitions() {
        let mut state = AppState::default();

        state.dispatch(AppCommand::EnterEditMode);
        assert_eq!(state.mode, AppMode::Edit);

        state.dispatch(AppCommand::OpenManager);
        assert_eq!(state.mode, AppMode::Manage);

        state.dispatch(AppCommand::ExitToNav);
        assert_eq!(state.mode, AppMode::Nav);
    }

    #[test]
    fn toggle_theme_emits_event_for_persistence() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::ToggleTheme);
        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(
            events,
            vec![
                AppEvent::ThemeChanged(Theme::Dark),
                AppEvent::StatusUpdated("dark".to_owned()),
            ],
        );
    }

    #[test]
    fn status_set_and_clear() {
        let mut state = AppState::default();

        let events = state.dispatch(AppCommand::SetStatus("imported 3 row(s)".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("imported 3 row(s)"));
        assert_eq!(
            events,
            vec![AppEvent::StatusUpdated("imported 3 row(s)".to_owned())],
        );

        let events = state.dispatch(AppCommand::ClearStatus);
        assert_eq!(state.status_line, None);
        assert_eq!(events, vec![AppEvent::StatusCleared]);
    }
}
