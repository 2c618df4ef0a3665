/// Prefix marking a line as a page command rather than an amount.
pub const COMMAND_PREFIX: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    Connect,
    Disconnect,
    Send,
    Quit,
    Help,
}

impl ShellCommand {
    pub const ALL: [ShellCommand; 5] = [
        ShellCommand::Connect,
        ShellCommand::Disconnect,
        ShellCommand::Send,
        ShellCommand::Quit,
        ShellCommand::Help,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShellCommand::Connect => "connect",
            ShellCommand::Disconnect => "disconnect",
            ShellCommand::Send => "send",
            ShellCommand::Quit => "quit",
            ShellCommand::Help => "help",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            ShellCommand::Connect => "connect the wallet",
            ShellCommand::Disconnect => "disconnect the wallet",
            ShellCommand::Send => "press Send to Base",
            ShellCommand::Quit => "leave the page (waits for a pending send)",
            ShellCommand::Help => "show this list",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput {
    /// New amount text, verbatim.
    Amount(String),
    Command(ShellCommand),
    Unknown(String),
}

impl ShellInput {
    pub fn parse(line: &str) -> Self {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        match line.strip_prefix(COMMAND_PREFIX) {
            Some(name) => {
                let name = name.trim().to_ascii_lowercase();
                match ShellCommand::from_name(&name) {
                    Some(command) => ShellInput::Command(command),
                    None => ShellInput::Unknown(name),
                }
            }
            None => ShellInput::Amount(line.to_string()),
        }
    }
}

/// Text shown for `:help`.
pub fn help_text() -> String {
    let mut text = String::from("Type an amount to replace the current one, or a command:");
    for command in ShellCommand::ALL {
        text.push_str(&format!("\n  {}{:<11} {}", COMMAND_PREFIX, command.name(), command.describe()));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(":connect", ShellInput::Command(ShellCommand::Connect))]
    #[test_case(" :send", ShellInput::Amount(" :send".to_string()) ; "leading space is an amount")]
    #[test_case(":SEND ", ShellInput::Command(ShellCommand::Send) ; "case and padding")]
    #[test_case(":q", ShellInput::Unknown("q".to_string()))]
    #[test_case("1.5\r\n", ShellInput::Amount("1.5".to_string()) ; "line ending stripped")]
    #[test_case(" 1.5 ", ShellInput::Amount(" 1.5 ".to_string()) ; "amount verbatim")]
    #[test_case("", ShellInput::Amount(String::new()) ; "empty clears")]
    fn parses_lines(line: &str, expected: ShellInput) {
        assert_eq!(ShellInput::parse(line), expected);
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();
        for command in ShellCommand::ALL {
            assert!(help.contains(&format!(":{}", command.name())));
        }
    }
}
