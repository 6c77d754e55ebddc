// src/wizard/state.rs
// =============================================================================
// The wizard's steps as a state machine.
//
// The state is a plain value: `transition` takes the current state and an
// event and returns the next state, or an error if the event makes no sense
// in that state. Nothing is stored globally.
//
//   start -> extension_check -> (download_extension ->) wait_for_bookmarks
//         -> check_bookmarks -> analyze <-> organize
// =============================================================================

use crate::error::{Error, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardState {
    #[default]
    Start,
    ExtensionCheck,
    DownloadExtension,
    WaitForBookmarks,
    CheckBookmarks,
    Analyze,
    Organize,
}

/// Things that move the wizard forward: mostly the user's choices, plus the
/// outcome of looking for received bookmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ExtractBookmarks,
    ExtensionInstalled,
    ExtensionMissing,
    ExtensionDownloaded,
    BookmarksSent,
    /// How many bookmarks the snapshot holds
    BookmarksFound(usize),
    TryAgain,
    Analyze,
    Organize,
    Reanalyze,
}

impl WizardState {
    pub fn transition(self, event: Event) -> Result<WizardState> {
        use Event as E;
        use WizardState as S;

        let next = match (self, event) {
            (S::Start, E::ExtractBookmarks) => S::ExtensionCheck,
            (S::ExtensionCheck, E::ExtensionInstalled) => S::WaitForBookmarks,
            (S::ExtensionCheck, E::ExtensionMissing) => S::DownloadExtension,
            (S::DownloadExtension, E::ExtensionDownloaded) => S::WaitForBookmarks,
            (S::WaitForBookmarks, E::BookmarksSent) => S::CheckBookmarks,
            (S::CheckBookmarks, E::BookmarksFound(0)) => S::CheckBookmarks,
            (S::CheckBookmarks, E::BookmarksFound(_)) => S::Analyze,
            (S::CheckBookmarks, E::TryAgain) => S::WaitForBookmarks,
            (S::Analyze, E::Analyze) => S::Analyze,
            (S::Analyze, E::Organize) => S::Organize,
            (S::Organize, E::Reanalyze) => S::Analyze,
            (state, event) => {
                return Err(Error::InvalidTransition {
                    state: state.to_string(),
                    event: format!("{:?}", event),
                })
            }
        };

        Ok(next)
    }

    pub fn name(&self) -> &'static str {
        match self {
            WizardState::Start => "start",
            WizardState::ExtensionCheck => "extension_check",
            WizardState::DownloadExtension => "download_extension",
            WizardState::WaitForBookmarks => "wait_for_bookmarks",
            WizardState::CheckBookmarks => "check_bookmarks",
            WizardState::Analyze => "analyze",
            WizardState::Organize => "organize",
        }
    }
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
