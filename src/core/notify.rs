//! Completion signal sent once an upload succeeds

use serde::{Deserialize, Serialize};

/// Tells the notification side which URL to show before the surface closes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSignal {
    pub url_to_show: String,
}

/// Shows the user-visible notification and closes the annotation surface
pub trait Notifier {
    fn notify_and_close(&mut self, signal: CompletionSignal);
}

/// Notifier for the command line: prints the URL on stdout
#[derive(Debug, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify_and_close(&mut self, signal: CompletionSignal) {
        println!("{}", signal.url_to_show);
    }
}

/// Records signals; useful for headless runs
impl Notifier for Vec<CompletionSignal> {
    fn notify_and_close(&mut self, signal: CompletionSignal) {
        self.push(signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_uses_camel_case_wire_name() {
        let signal = CompletionSignal {
            url_to_show: "https://img.example/a.png".into(),
        };
        assert_eq!(
            serde_json::to_string(&signal).unwrap(),
            r#"{"urlToShow":"https://img.example/a.png"}"#
        );
    }
}
