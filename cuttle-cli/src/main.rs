use clap::{Parser, Subcommand};
use cuttle_cli::{CliError, LogConfig, Result};
use cuttle_core::{Board, Card, CardView, DropOutcome, DropTarget, MatchRole, ZoneId};
use cuttle_p2p::{
    MatchEvent, MatchSession, MatchboxConnector, PeerCode, SessionConfig, SessionManager,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "cuttle-cli")]
#[command(version, about = "Cuttle P2P - host or join a two-player match")]
struct Cli {
    /// Log at debug level by default
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a shareable identity and wait for an opponent
    Host {
        /// Matchbox signalling server URL
        #[arg(short = 's', long, default_value = "wss://match.cuttle.cards")]
        server: String,

        /// Transport poll interval in milliseconds
        #[arg(long, default_value_t = 50)]
        poll_interval_ms: u64,

        /// TURN server URL (optional, format: turn:host:port)
        #[arg(long)]
        turn_server: Option<String>,

        /// TURN username (required if turn-server is set)
        #[arg(long)]
        turn_username: Option<String>,

        /// TURN credential (required if turn-server is set)
        #[arg(long)]
        turn_credential: Option<String>,
    },

    /// Join an opponent via the peer code they shared
    Join {
        /// Matchbox signalling server URL
        #[arg(short = 's', long, default_value = "wss://match.cuttle.cards")]
        server: String,

        /// Peer code shared by the opponent
        #[arg(short = 'c', long)]
        code: String,

        /// Transport poll interval in milliseconds
        #[arg(long, default_value_t = 50)]
        poll_interval_ms: u64,

        /// TURN server URL (optional, format: turn:host:port)
        #[arg(long)]
        turn_server: Option<String>,

        /// TURN username (required if turn-server is set)
        #[arg(long)]
        turn_username: Option<String>,

        /// TURN credential (required if turn-server is set)
        #[arg(long)]
        turn_credential: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_config = if cli.verbose {
        LogConfig::dev()
    } else {
        LogConfig::default()
    };
    log_config.init().map_err(CliError::InvalidConfig)?;

    match cli.command {
        Commands::Host {
            server,
            poll_interval_ms,
            turn_server,
            turn_username,
            turn_credential,
        } => {
            let config = build_config(
                &server,
                poll_interval_ms,
                turn_server,
                turn_username,
                turn_credential,
            )?;
            host(config).await?;
        }
        Commands::Join {
            server,
            code,
            poll_interval_ms,
            turn_server,
            turn_username,
            turn_credential,
        } => {
            let config = build_config(
                &server,
                poll_interval_ms,
                turn_server,
                turn_username,
                turn_credential,
            )?;
            join(config, &code).await?;
        }
    }

    Ok(())
}

fn build_config(
    server: &str,
    poll_interval_ms: u64,
    turn_server: Option<String>,
    turn_username: Option<String>,
    turn_credential: Option<String>,
) -> Result<SessionConfig> {
    let mut config =
        SessionConfig::new(server.to_string()).with_poll_interval(poll_interval_ms);

    if let Some(turn_url) = turn_server {
        match (turn_username, turn_credential) {
            (Some(username), Some(credential)) => {
                info!("Using TURN server: {}", turn_url);
                config = config.with_turn_server(turn_url, username, credential);
            }
            _ => {
                return Err(CliError::InvalidConfig(
                    "TURN server requires both username and credential".to_string(),
                ));
            }
        }
    }

    Ok(config)
}

fn open_session(config: SessionConfig) -> MatchSession<MatchboxConnector> {
    let connector = MatchboxConnector::new(config.ice_servers.clone());
    MatchSession::new(SessionManager::new(config, connector))
}

async fn host(config: SessionConfig) -> Result<()> {
    info!(
        "Connecting to signalling server: {}",
        config.signalling_server
    );

    let mut session = open_session(config);
    session.initialize();

    info!("Waiting for an opponent...");
    info!("Press Ctrl+C to exit");
    run_loop(session, None).await
}

async fn join(config: SessionConfig, code_str: &str) -> Result<()> {
    let code =
        PeerCode::parse(code_str).map_err(|_| CliError::InvalidPeerCode(code_str.to_string()))?;

    info!(
        "Connecting to signalling server: {}",
        config.signalling_server
    );

    let mut session = open_session(config);
    session.initialize();

    info!("Press Ctrl+C to exit");
    run_loop(session, Some(code)).await
}

async fn run_loop(
    mut session: MatchSession<MatchboxConnector>,
    mut dial_on_open: Option<PeerCode>,
) -> Result<()> {
    let mut interval = tokio::time::interval(Duration::from_millis(
        session.manager().config().poll_interval_ms,
    ));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                for event in session.poll() {
                    // Dialing needs an open identity, so the join command
                    // waits for this event before going out.
                    if let MatchEvent::IdentityOpen { .. } = event {
                        if let Some(code) = dial_on_open.take() {
                            info!("Dialing peer: {}", code);
                            session.connect_to_peer(code);
                        }
                    }
                    show_event(&session, event);
                }
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !handle_line(&mut session, line.trim()) {
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                break;
            }
        }
    }

    session.destroy();
    Ok(())
}

fn show_event(session: &MatchSession<MatchboxConnector>, event: MatchEvent) {
    match event {
        MatchEvent::IdentityOpen { code } => {
            info!("✓ Identity open");
            info!("📋 Peer code: {}", code);
            // Only worth sharing while nobody has been dialed yet.
            if session.manager().session().is_none() {
                let server = &session.manager().config().signalling_server;
                info!("Invite an opponent with:");
                info!("  cuttle-cli join --server {} --code {}", server, code);
            }
        }
        MatchEvent::Connected { role, peer } => {
            info!("🟢 Opponent connected: {}", peer);
            match role {
                MatchRole::Host => {
                    info!("You host this match as {} and play first", role.slot());
                }
                MatchRole::Guest => {
                    info!("You joined as {}; the host plays first", role.slot());
                }
            }
            info!("Type to chat, /start deals demo hands, /help lists commands");
        }
        MatchEvent::Disconnected => {
            warn!("🔴 Opponent disconnected");
        }
        MatchEvent::SessionFailed { message } => {
            warn!("🔴 Session failed: {}", message);
        }
        MatchEvent::IdentityFailed { message } => {
            warn!("🔴 Identity failed: {}", message);
            warn!("Restart to mint a new peer code");
        }
        MatchEvent::ChatReceived { entry } => {
            info!("💬 {}: {}", entry.sender, entry.body);
        }
        MatchEvent::GameAnnounced { id } => {
            info!("🎴 Opponent announced match {}", id);
        }
        MatchEvent::OpponentMoved { moved } => {
            info!(
                "🎴 Opponent moved {} from {} to {}",
                moved.card, moved.from, moved.to
            );
        }
    }
}

/// Returns whether the loop should keep running.
fn handle_line(session: &mut MatchSession<MatchboxConnector>, line: &str) -> bool {
    if line.is_empty() {
        return true;
    }

    if let Some(command) = line.strip_prefix('/') {
        match run_command(session, command) {
            Ok(keep_going) => keep_going,
            Err(err) => {
                warn!("{}", err);
                true
            }
        }
    } else {
        if session.send_chat(line).is_none() {
            warn!("Not connected; chat not sent");
        }
        true
    }
}

fn run_command(session: &mut MatchSession<MatchboxConnector>, command: &str) -> Result<bool> {
    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };

    match name {
        "quit" | "q" => {
            session.disconnect();
            Ok(false)
        }
        "help" => {
            print_help();
            Ok(true)
        }
        "start" => {
            start_demo_match(session);
            Ok(true)
        }
        "draw" => {
            let moved = session.draw()?;
            info!("🎴 You drew {}", moved.card);
            Ok(true)
        }
        "play" => {
            let mut parts = rest.split_whitespace();
            let card: Card = parse_arg(parts.next(), "/play <card> <zone>")?;
            let zone: ZoneId = parse_arg(parts.next(), "/play <card> <zone>")?;
            match session.play_card(ZoneId::PlayerHand, card, DropTarget::Zone(zone))? {
                DropOutcome::Moved(moved) => info!("🎴 Played {} to {}", moved.card, moved.to),
                DropOutcome::ReturnedToOrigin => info!("{} stays in your hand", card),
            }
            Ok(true)
        }
        "board" => {
            print_board(session.board());
            Ok(true)
        }
        "send" => {
            let value: serde_json::Value = serde_json::from_str(rest)
                .map_err(|e| CliError::InvalidCommand(format!("not JSON: {e}")))?;
            if session.send_data(&value) {
                info!("📤 Sent");
            } else {
                warn!("Not connected; message not sent");
            }
            Ok(true)
        }
        other => Err(CliError::UnknownCommand(other.to_string())),
    }
}

fn parse_arg<T>(arg: Option<&str>, usage: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = arg.ok_or_else(|| CliError::InvalidCommand(format!("usage: {usage}")))?;
    raw.parse()
        .map_err(|e: T::Err| CliError::InvalidCommand(format!("{raw}: {e}")))
}

/// Deals a deterministic opening so both sides can push cards around
/// without a rules engine: the host takes the first five cards of the
/// sorted deck, the guest the next five, the rest forms the deck. Both
/// peers run the same split locally, so no wire traffic is needed.
fn start_demo_match(session: &mut MatchSession<MatchboxConnector>) {
    let Some(role) = session.match_state().role() else {
        warn!("No opponent yet; /start needs a connected session");
        return;
    };
    if session.match_state().is_in_game() {
        warn!("Match already started");
        return;
    }

    let deck = Card::standard_deck();
    let (mine, theirs) = match role {
        MatchRole::Host => (&deck[0..5], &deck[5..10]),
        MatchRole::Guest => (&deck[5..10], &deck[0..5]),
    };

    let board = session.board_mut();
    for card in mine {
        board.place_card(ZoneId::PlayerHand, *card);
    }
    for card in theirs {
        board.place_card(ZoneId::OppHand, *card);
    }
    for card in &deck[10..] {
        board.place_card(ZoneId::Deck, *card);
    }

    session.start_match();
    info!(
        "🎴 Demo hands dealt; match {} started",
        session.match_state().id()
    );
    print_board(session.board());
}

fn print_board(board: &Board) {
    for zone in board.zones() {
        let faces: Vec<String> = zone
            .views()
            .iter()
            .map(|view| match view {
                CardView::FaceUp(card) => card.code(),
                CardView::FaceDown => "??".to_string(),
            })
            .collect();
        info!("{:>13}: {}", zone.id().as_str(), faces.join(" "));
    }
}

fn print_help() {
    info!("Commands:");
    info!("  /start              deal demo hands and start the match");
    info!("  /play <card> <zone> move a card out of your hand (e.g. /play AH player-point)");
    info!("  /draw               take the top deck card");
    info!("  /board              print the table");
    info!("  /send <json>        send a raw JSON message");
    info!("  /quit               close the session and exit");
    info!("  plain text          chat with your opponent");
}
