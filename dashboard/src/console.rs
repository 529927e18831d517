use std::io::BufRead;

use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use proofuino_common::{Power, TargetInput};

use crate::{device::DeviceApi, poller::SnapshotReceiver, sender::CommandSender};

const HELP: &str = "\
commands:
  <n> | set <n>   enter a target dough temperature (whole degrees)
  submit          send the entered target to the device
  on | off        switch the device on or off
  toggle          flip the power switch
  help            show this text
  quit            exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Enter(String),
    Submit,
    Power(Power),
    Toggle,
    Help,
    Quit,
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn parse_line(line: &str) -> Option<ConsoleCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "set" => ConsoleCommand::Enter(rest.to_string()),
        "submit" | "s" => ConsoleCommand::Submit,
        "on" => ConsoleCommand::Power(Power::On),
        "off" => ConsoleCommand::Power(Power::Off),
        "toggle" | "t" => ConsoleCommand::Toggle,
        "help" | "h" | "?" => ConsoleCommand::Help,
        "quit" | "q" | "exit" => ConsoleCommand::Quit,
        _ if word.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.')) => {
            ConsoleCommand::Enter(line.to_string())
        }
        _ => ConsoleCommand::Unknown(line.to_string()),
    };
    Some(command)
}

/// Reads stdin lines on a dedicated thread. A read blocked there is never
/// awaited by the runtime, so shutdown does not wait for the next Enter.
pub fn spawn_stdin_reader() -> std::io::Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::Builder::new()
        .name("console-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!("failed to read console input: {err}");
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}

/// Stdin-driven stand-in for the controls form and the power switch.
pub struct Console<D> {
    sender: CommandSender<D>,
    snapshots: SnapshotReceiver,
    input: watch::Sender<TargetInput>,
}

impl<D: DeviceApi> Console<D> {
    pub fn new(
        sender: CommandSender<D>,
        snapshots: SnapshotReceiver,
        input: watch::Sender<TargetInput>,
    ) -> Self {
        Self {
            sender,
            snapshots,
            input,
        }
    }

    /// Handles lines until `quit` or until the line source closes.
    pub async fn run(&mut self, mut lines: mpsc::Receiver<String>) {
        while let Some(line) = lines.recv().await {
            let Some(command) = parse_line(&line) else {
                continue;
            };
            if self.handle(command).await == Flow::Quit {
                break;
            }
        }
    }

    pub async fn handle(&mut self, command: ConsoleCommand) -> Flow {
        match command {
            ConsoleCommand::Enter(raw) => {
                let mut input = *self.input.borrow();
                match input.enter(&raw) {
                    Ok(value) => {
                        self.input.send_replace(input);
                        info!("target entry set to {value}");
                    }
                    Err(err) => warn!("target entry rejected: {err}"),
                }
            }
            ConsoleCommand::Submit => {
                if self.controls_visible() {
                    let input = *self.input.borrow();
                    self.sender.submit_target(&input).await;
                } else {
                    info!("controls are hidden while the device is paused or loading");
                }
            }
            ConsoleCommand::Power(power) => {
                if self.has_snapshot() {
                    self.sender.set_power(power).await;
                } else {
                    info!("power switch unavailable until the first status arrives");
                }
            }
            ConsoleCommand::Toggle => match self.paused() {
                Some(paused) => {
                    self.sender.set_power(Power::from_checked(paused)).await;
                }
                None => info!("power switch unavailable until the first status arrives"),
            },
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => return Flow::Quit,
            ConsoleCommand::Unknown(line) => warn!("unknown command '{line}', try 'help'"),
        }
        Flow::Continue
    }

    fn paused(&self) -> Option<bool> {
        self.snapshots
            .borrow()
            .as_ref()
            .map(|polled| polled.snapshot.state.is_paused())
    }

    fn has_snapshot(&self) -> bool {
        self.paused().is_some()
    }

    fn controls_visible(&self) -> bool {
        self.paused() == Some(false)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use proofuino_common::{
        Command, PolledStatus, ProofState, RelayState, StatusSnapshot,
    };

    use super::*;
    use crate::device::DeviceError;

    #[derive(Default)]
    struct RecordingDevice {
        sent: Mutex<Vec<Command>>,
    }

    #[async_trait]
    impl DeviceApi for RecordingDevice {
        async fn fetch_status(&self) -> Result<StatusSnapshot, DeviceError> {
            unreachable!("console never polls")
        }

        async fn send(&self, command: Command) -> Result<(), DeviceError> {
            self.sent.lock().unwrap().push(command);
            Ok(())
        }
    }

    fn polled(state: ProofState) -> Option<PolledStatus> {
        Some(PolledStatus::now(StatusSnapshot {
            state,
            target_temp_c: 27.0,
            relay: RelayState::Off,
            dough_temp_c: 24.0,
            box_temp_c: 26.0,
        }))
    }

    struct Harness {
        device: Arc<RecordingDevice>,
        console: Console<RecordingDevice>,
        snapshots: watch::Sender<Option<PolledStatus>>,
        input: watch::Receiver<TargetInput>,
    }

    fn harness(initial: Option<PolledStatus>) -> Harness {
        let device = Arc::new(RecordingDevice::default());
        let (snapshots, snapshot_rx) = watch::channel(initial);
        let (input_tx, input) = watch::channel(TargetInput::default());
        let console = Console::new(CommandSender::new(device.clone()), snapshot_rx, input_tx);
        Harness {
            device,
            console,
            snapshots,
            input,
        }
    }

    fn lines(script: &str) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(32);
        for line in script.lines() {
            tx.try_send(line.to_string()).unwrap();
        }
        rx
    }

    impl Harness {
        fn sent(&self) -> Vec<Command> {
            self.device.sent.lock().unwrap().clone()
        }
    }

    #[test]
    fn parses_console_lines() {
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("27"), Some(ConsoleCommand::Enter("27".to_string())));
        assert_eq!(
            parse_line("set 26.5"),
            Some(ConsoleCommand::Enter("26.5".to_string()))
        );
        assert_eq!(parse_line("+5"), Some(ConsoleCommand::Enter("+5".to_string())));
        assert_eq!(parse_line("OFF"), Some(ConsoleCommand::Power(Power::Off)));
        assert_eq!(parse_line("t"), Some(ConsoleCommand::Toggle));
        assert_eq!(parse_line("q"), Some(ConsoleCommand::Quit));
        assert_eq!(
            parse_line("warmer please"),
            Some(ConsoleCommand::Unknown("warmer please".to_string()))
        );
    }

    #[tokio::test]
    async fn submit_sends_current_entry_exactly_once() {
        let mut h = harness(polled(ProofState::HoldOff));

        h.console.run(lines("set 26\nsubmit\n")).await;

        assert_eq!(h.sent(), vec![Command::SetTarget(26)]);
        assert_eq!(h.input.borrow().value(), 26);
    }

    #[tokio::test]
    async fn rejected_entry_does_not_change_field() {
        let mut h = harness(polled(ProofState::HoldOff));

        h.console.run(lines("28\n28.4\nset hot\nsubmit\n")).await;

        assert_eq!(h.input.borrow().value(), 28);
        assert_eq!(h.sent(), vec![Command::SetTarget(28)]);
    }

    #[tokio::test]
    async fn submit_is_ignored_while_paused_or_loading() {
        let mut h = harness(None);
        h.console.run(lines("25\nsubmit\n")).await;
        assert!(h.sent().is_empty());

        h.snapshots.send_replace(polled(ProofState::Paused));
        h.console.run(lines("submit\n")).await;
        assert!(h.sent().is_empty());
    }

    #[tokio::test]
    async fn toggle_sends_one_request_per_flip() {
        let mut h = harness(polled(ProofState::Paused));

        assert_eq!(h.console.handle(ConsoleCommand::Toggle).await, Flow::Continue);
        assert_eq!(h.sent(), vec![Command::Power(Power::On)]);

        h.snapshots.send_replace(polled(ProofState::Start));
        h.console.handle(ConsoleCommand::Toggle).await;

        assert_eq!(
            h.sent(),
            vec![Command::Power(Power::On), Command::Power(Power::Off)]
        );
    }

    #[tokio::test]
    async fn power_switch_needs_a_snapshot() {
        let mut h = harness(None);

        h.console.run(lines("on\ntoggle\n")).await;
        assert!(h.sent().is_empty());

        h.snapshots.send_replace(polled(ProofState::Start));
        h.console.run(lines("off\n")).await;
        assert_eq!(h.sent(), vec![Command::Power(Power::Off)]);
    }

    #[tokio::test]
    async fn plus_signed_entry_is_accepted() {
        let mut h = harness(polled(ProofState::HoldOn));

        h.console.run(lines("+5\nsubmit\n")).await;

        assert_eq!(h.input.borrow().value(), 5);
        assert_eq!(h.sent(), vec![Command::SetTarget(5)]);
    }

    #[tokio::test]
    async fn quit_stops_reading() {
        let mut h = harness(polled(ProofState::Start));

        h.console.run(lines("quit\non\n")).await;

        assert!(h.sent().is_empty());
    }
}
