//! Operator actions and the line syntax used by `simdash watch`

use std::str::FromStr;
use thiserror::Error;

use crate::client::{ControlCommand, SimulationParams};

/// Operator input that could not be turned into an action; nothing is sent
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("invalid argument for {command}: {message}")]
    InvalidArgument { command: String, message: String },

    #[error("a name is required to save data")]
    EmptyName,
}

/// Everything an operator can ask the dashboard to do
#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    /// `None` fields fall back to the configured defaults
    Connect {
        host: Option<String>,
        port: Option<u16>,
    },
    Disconnect,
    Control(ControlCommand),
    SetParams(SimulationParams),
    Clear,
    Save { name: String },
    CheckStatus,
    /// Restart the push channel after it gave up
    Reconnect,
    Help,
    Quit,
}

impl UserAction {
    /// Builds a save action, rejecting blank names
    pub fn save(name: impl Into<String>) -> Result<Self, ActionError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ActionError::EmptyName);
        }
        Ok(UserAction::Save {
            name: trimmed.to_string(),
        })
    }

    /// Short name used in logs and metrics labels
    pub fn name(&self) -> &'static str {
        match self {
            UserAction::Connect { .. } => "connect",
            UserAction::Disconnect => "disconnect",
            UserAction::Control(cmd) => cmd.as_str(),
            UserAction::SetParams(_) => "set_params",
            UserAction::Clear => "clear",
            UserAction::Save { .. } => "save",
            UserAction::CheckStatus => "status",
            UserAction::Reconnect => "reconnect",
            UserAction::Help => "help",
            UserAction::Quit => "quit",
        }
    }
}

pub const HELP: &str = "\
commands:
  connect [host] [port]      connect the backend to the simulation
  disconnect                 disconnect from the simulation
  start | stop | pause | resume
  params <mobility_speed> <node_count> <packet_size> <tx_power>
  clear                      clear recorded data
  save <name>                save recorded data under a name
  status                     query the simulation status
  reconnect                  reopen the push channel
  quit                       leave the dashboard";

impl FromStr for UserAction {
    type Err = ActionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(ActionError::Unknown(String::new()));
        };
        let head = head.to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        match head.as_str() {
            "connect" => {
                let host = args.first().map(|h| h.to_string());
                let port = match args.get(1) {
                    Some(p) => Some(p.parse::<u16>().map_err(|_| ActionError::InvalidArgument {
                        command: head.clone(),
                        message: format!("'{}' is not a port number", p),
                    })?),
                    None => None,
                };
                Ok(UserAction::Connect { host, port })
            }
            "disconnect" => Ok(UserAction::Disconnect),
            "start" | "stop" | "pause" | "resume" => {
                let cmd = head
                    .parse::<ControlCommand>()
                    .map_err(|_| ActionError::Unknown(head.clone()))?;
                Ok(UserAction::Control(cmd))
            }
            "params" | "set-params" | "set_params" => {
                if args.len() != 4 {
                    return Err(ActionError::InvalidArgument {
                        command: head,
                        message: "expected 4 values".to_string(),
                    });
                }
                let bad = |what: &str, value: &str| ActionError::InvalidArgument {
                    command: "params".to_string(),
                    message: format!("{} '{}' is not a number", what, value),
                };
                Ok(UserAction::SetParams(SimulationParams {
                    mobility_speed: args[0].parse().map_err(|_| bad("mobility_speed", args[0]))?,
                    node_count: args[1].parse().map_err(|_| bad("node_count", args[1]))?,
                    packet_size: args[2].parse().map_err(|_| bad("packet_size", args[2]))?,
                    tx_power: args[3].parse().map_err(|_| bad("tx_power", args[3]))?,
                }))
            }
            "clear" => Ok(UserAction::Clear),
            "save" => UserAction::save(args.join(" ")),
            "status" => Ok(UserAction::CheckStatus),
            "reconnect" => Ok(UserAction::Reconnect),
            "help" | "?" => Ok(UserAction::Help),
            "quit" | "exit" | "q" => Ok(UserAction::Quit),
            _ => Err(ActionError::Unknown(head)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_connect_variants() {
        assert_eq!(
            "connect".parse::<UserAction>().unwrap(),
            UserAction::Connect {
                host: None,
                port: None
            }
        );
        assert_eq!(
            "connect sim-01 4243".parse::<UserAction>().unwrap(),
            UserAction::Connect {
                host: Some("sim-01".to_string()),
                port: Some(4243)
            }
        );
        assert!(matches!(
            "connect sim-01 http".parse::<UserAction>(),
            Err(ActionError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_parse_control_commands() {
        assert_eq!(
            "PAUSE".parse::<UserAction>().unwrap(),
            UserAction::Control(ControlCommand::Pause)
        );
        assert_eq!(
            "resume".parse::<UserAction>().unwrap(),
            UserAction::Control(ControlCommand::Resume)
        );
    }

    #[test]
    fn test_parse_params() {
        let action = "params 13.9 50 512 20.5".parse::<UserAction>().unwrap();
        assert_eq!(
            action,
            UserAction::SetParams(SimulationParams {
                mobility_speed: 13.9,
                node_count: 50,
                packet_size: 512,
                tx_power: 20.5,
            })
        );
        assert!("params 1 2 3".parse::<UserAction>().is_err());
        assert!("params 1 many 3 4".parse::<UserAction>().is_err());
    }

    #[test]
    fn test_save_requires_name() {
        assert_eq!("save".parse::<UserAction>(), Err(ActionError::EmptyName));
        assert_eq!(UserAction::save("   "), Err(ActionError::EmptyName));
        assert_eq!(
            "save highway run 2".parse::<UserAction>().unwrap(),
            UserAction::Save {
                name: "highway run 2".to_string()
            }
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert!(matches!(
            "launch".parse::<UserAction>(),
            Err(ActionError::Unknown(ref c)) if c == "launch"
        ));
        assert!("   ".parse::<UserAction>().is_err());
    }
}
