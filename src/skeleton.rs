//! Server side of the protocol: answers requests against a shared registry.

use std::sync::Arc;

use anyhow::anyhow;
use log::{debug, info, warn};
use tokio::net::TcpListener;

use crate::protocol::{Message, Request, Response, PROTOCOL_VERSION};
use crate::registry::{GameRegistry, RegistryError};
use crate::transport::{tcp::TcpTransport, ConnectionClosed, Transport};

/// Answer one request. Engine errors become [`Response::Error`] carrying their
/// kind; nothing here fails the session.
pub fn handle_request(registry: &GameRegistry, request: Request) -> Response {
    match dispatch(registry, request) {
        Ok(response) => response,
        Err(e) => Response::Error {
            kind: e.kind(),
            message: e.to_string(),
        },
    }
}

fn dispatch(registry: &GameRegistry, request: Request) -> Result<Response, RegistryError> {
    let response = match request {
        Request::CreateGame { player1, player2 } => {
            Response::Game(registry.create_game(&player1, &player2)?)
        }
        Request::GetGame { game } => Response::Game(registry.summary(game)?),
        Request::ListGames => Response::Games(registry.games()?),
        Request::PlaceShip {
            game,
            player,
            ship_type,
            x,
            y,
            orientation,
        } => Response::Placed(registry.place_ship(
            game,
            player,
            ship_type,
            x.into(),
            y.into(),
            orientation,
        )?),
        Request::RandomPlacement { game, player, seed } => {
            registry.random_place_ships_seeded(game, player, seed)?;
            Response::Ack
        }
        Request::Ready { game, player } => Response::Ready {
            started: registry.set_player_ready(game, player)?,
        },
        Request::FireShot { game, player, x, y } => {
            Response::Shot(registry.fire_shot(game, player, x.into(), y.into())?)
        }
        Request::CancelGame { game } => {
            registry.cancel_game(game)?;
            Response::Ack
        }
        Request::Boards { game, player } => {
            let (own, target) = registry.board_views(game, player)?;
            Response::Boards { own, target }
        }
    };
    Ok(response)
}

/// One client session bound to a transport.
pub struct Skeleton<T: Transport> {
    registry: Arc<GameRegistry>,
    transport: T,
}

impl<T: Transport> Skeleton<T> {
    pub fn new(registry: Arc<GameRegistry>, transport: T) -> Self {
        Self {
            registry,
            transport,
        }
    }

    async fn handshake(&mut self) -> anyhow::Result<()> {
        match self.transport.recv().await? {
            Message::Handshake { version } if version == PROTOCOL_VERSION => {
                self.transport
                    .send(Message::HandshakeAck {
                        version: PROTOCOL_VERSION,
                    })
                    .await
            }
            Message::Handshake { version } => {
                self.transport
                    .send(Message::HandshakeAck {
                        version: PROTOCOL_VERSION,
                    })
                    .await?;
                Err(anyhow!(
                    "Protocol version mismatch: expected {}, got {}",
                    PROTOCOL_VERSION,
                    version
                ))
            }
            other => Err(anyhow!("Expected Handshake, got {:?}", other)),
        }
    }

    /// Handshake, then answer requests until the peer closes the connection.
    ///
    /// Requests must carry consecutive sequence numbers starting at zero. A
    /// clean close ends the session with `Ok`; a broken or undecodable frame
    /// is returned as the error.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.handshake().await?;
        let mut expected_seq: u64 = 0;
        loop {
            let msg = match self.transport.recv().await {
                Ok(msg) => msg,
                Err(e) if ConnectionClosed::is(&e) => return Ok(()),
                Err(e) => return Err(e),
            };
            let (seq, body) = match msg {
                Message::Request { seq, body } => (seq, body),
                other => return Err(anyhow!("Expected Request, got {:?}", other)),
            };
            if seq != expected_seq {
                return Err(anyhow!(
                    "Out-of-order request: expected seq {}, got {}",
                    expected_seq,
                    seq
                ));
            }
            debug!("request {seq}: {body:?}");
            let body = handle_request(&self.registry, body);
            self.transport.send(Message::Response { seq, body }).await?;
            expected_seq += 1;
        }
    }
}

/// Accept connections forever, one session task per client, all sharing
/// `registry`.
pub async fn serve(listener: TcpListener, registry: Arc<GameRegistry>) -> anyhow::Result<()> {
    info!("listening on {}", listener.local_addr()?);
    loop {
        let (stream, addr) = listener.accept().await?;
        info!("client connected from {addr}");
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            let mut session = Skeleton::new(registry, TcpTransport::new(stream));
            match session.run().await {
                Ok(()) => info!("client {addr} disconnected"),
                Err(e) => warn!("session with {addr} ended: {e}"),
            }
        });
    }
}
