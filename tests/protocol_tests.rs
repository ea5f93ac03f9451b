#![cfg(feature = "net")]

use std::sync::Arc;

use broadside::domain::CellView;
use broadside::transport::in_memory::InMemoryTransport;
use broadside::transport::tcp::TcpTransport;
use broadside::transport::Transport;
use broadside::{
    error_kind, handle_request, serve, ConnectionClosed, ErrorKind, GameApi, GameId,
    GameRegistry, GameState, Message, Orientation, Request, Response, ShipType, Skeleton, Stub,
    PROTOCOL_VERSION,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn spawn_session(
    registry: Arc<GameRegistry>,
) -> (InMemoryTransport, tokio::task::JoinHandle<anyhow::Result<()>>) {
    let (server_transport, client_transport) = InMemoryTransport::pair();
    let server = tokio::spawn(async move {
        let mut skeleton = Skeleton::new(registry, server_transport);
        skeleton.run().await
    });
    (client_transport, server)
}

#[test]
fn test_handle_request_maps_errors() {
    let registry = GameRegistry::new();
    let missing = GameId::new();
    match handle_request(&registry, Request::GetGame { game: missing }) {
        Response::Error { kind, message } => {
            assert_eq!(kind, ErrorKind::NotFound);
            assert!(message.contains(&missing.to_string()));
        }
        other => panic!("expected Error, got {other:?}"),
    }
    match handle_request(&registry, Request::ListGames) {
        Response::Games(games) => assert!(games.is_empty()),
        other => panic!("expected Games, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stub_skeleton_in_memory() -> anyhow::Result<()> {
    let registry = Arc::new(GameRegistry::new());
    let (client_transport, server) = spawn_session(Arc::clone(&registry));
    let stub = Stub::new(client_transport);

    let game = stub.create_game("Alice", "Bob").await?;
    let (alice, bob) = (game.player1.id, game.player2.id);
    assert_eq!(registry.len(), 1);

    assert!(
        stub.place_ship(game.id, alice, ShipType::Carrier, 0, 0, Orientation::Horizontal)
            .await?
    );
    assert!(
        !stub
            .place_ship(game.id, alice, ShipType::Destroyer, 5, 1, Orientation::Vertical)
            .await?
    );
    stub.random_placement(game.id, bob, None).await?;
    assert!(!stub.set_ready(game.id, bob).await?);
    assert!(stub.set_ready(game.id, alice).await?);

    let summary = stub.game(game.id).await?.expect("game exists");
    assert_eq!(summary.state, GameState::InProgress);
    assert_eq!(summary.player1.ships_placed, 1);

    let err = stub.fire_shot(game.id, bob, 0, 0).await.unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::IllegalState));

    let (own, _) = stub.boards(game.id, bob).await?;
    let (x, y) = (0..10u8)
        .flat_map(|y| (0..10u8).map(move |x| (x, y)))
        .find(|&(x, y)| own.get(x.into(), y.into()) == Some(CellView::Unknown))
        .expect("open water");
    stub.fire_shot(game.id, alice, x, y).await?;
    let (_, target) = stub.boards(game.id, alice).await?;
    assert_eq!(target.get(x.into(), y.into()), Some(CellView::Miss));

    // bob shoots the carrier
    let shot = stub.fire_shot(game.id, bob, 0, 0).await?;
    assert!(shot.result().is_hit());

    let err = stub.fire_shot(game.id, alice, x, y).await.unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::InvalidArgument));

    assert!(stub.game(GameId::new()).await?.is_none());
    stub.cancel_game(game.id).await?;
    let games = stub.games().await?;
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].state, GameState::Cancelled);

    drop(stub);
    server.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_version_mismatch() -> anyhow::Result<()> {
    let (mut client, server) = spawn_session(Arc::new(GameRegistry::new()));
    client
        .send(Message::Handshake {
            version: PROTOCOL_VERSION + 1,
        })
        .await?;
    match client.recv().await? {
        Message::HandshakeAck { version } => assert_eq!(version, PROTOCOL_VERSION),
        other => panic!("expected HandshakeAck, got {other:?}"),
    }
    assert!(server.await?.is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_out_of_order_request() -> anyhow::Result<()> {
    let (mut client, server) = spawn_session(Arc::new(GameRegistry::new()));
    client
        .send(Message::Handshake {
            version: PROTOCOL_VERSION,
        })
        .await?;
    client.recv().await?;

    client
        .send(Message::Request {
            seq: 0,
            body: Request::ListGames,
        })
        .await?;
    match client.recv().await? {
        Message::Response { seq, body } => {
            assert_eq!(seq, 0);
            assert_eq!(body, Response::Games(Vec::new()));
        }
        other => panic!("expected Response, got {other:?}"),
    }

    client
        .send(Message::Request {
            seq: 5,
            body: Request::ListGames,
        })
        .await?;
    let err = server.await?.unwrap_err();
    assert!(err.to_string().contains("Out-of-order"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_request_before_handshake() -> anyhow::Result<()> {
    let (mut client, server) = spawn_session(Arc::new(GameRegistry::new()));
    client
        .send(Message::Request {
            seq: 0,
            body: Request::ListGames,
        })
        .await?;
    assert!(server.await?.is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tcp_server_shares_registry() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let registry = Arc::new(GameRegistry::new());
    let server = tokio::spawn(serve(listener, Arc::clone(&registry)));

    let first = Stub::new(TcpTransport::connect(addr).await?);
    let second = Stub::new(TcpTransport::connect(addr).await?);

    let game = first.create_game("Alice", "Bob").await?;
    let seen = second.game(game.id).await?.expect("game visible to both clients");
    assert_eq!(seen.player1.name, "Alice");

    first.random_placement(game.id, game.player1.id, Some(1)).await?;
    second.random_placement(game.id, game.player2.id, Some(2)).await?;
    assert!(first.set_ready(game.id, game.player1.id).await?);

    let err = second
        .fire_shot(game.id, game.player2.id, 0, 0)
        .await
        .unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::IllegalState));
    first.fire_shot(game.id, game.player1.id, 3, 3).await?;
    second.fire_shot(game.id, game.player2.id, 3, 3).await?;

    let summary = registry.summary(game.id)?;
    assert_eq!(summary.turn_count, 2);
    assert_eq!(second.games().await?.len(), 1);

    server.abort();
    Ok(())
}

/// Accept one TCP client and run a session for it.
async fn tcp_session(
    listener: TcpListener,
) -> anyhow::Result<tokio::task::JoinHandle<anyhow::Result<()>>> {
    Ok(tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        let mut skeleton = Skeleton::new(Arc::new(GameRegistry::new()), TcpTransport::new(socket));
        skeleton.run().await
    }))
}

async fn write_frame(stream: &mut TcpStream, payload: &[u8]) -> anyhow::Result<()> {
    stream.write_all(&(payload.len() as u32).to_be_bytes()).await?;
    stream.write_all(payload).await?;
    Ok(())
}

async fn raw_handshake(stream: &mut TcpStream) -> anyhow::Result<()> {
    let hello = bincode::serialize(&Message::Handshake {
        version: PROTOCOL_VERSION,
    })?;
    write_frame(stream, &hello).await?;
    let mut len = [0u8; 4];
    stream.read_exact(&mut len).await?;
    let mut body = vec![0u8; u32::from_be_bytes(len) as usize];
    stream.read_exact(&mut body).await?;
    let ack: Message = bincode::deserialize(&body)?;
    assert_eq!(
        ack,
        Message::HandshakeAck {
            version: PROTOCOL_VERSION
        }
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_undecodable_frame_fails_session() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tcp_session(listener).await?;

    let mut stream = TcpStream::connect(addr).await?;
    raw_handshake(&mut stream).await?;
    // no message variant has tag 99
    write_frame(&mut stream, &[99, 0, 0, 0]).await?;

    let err = server.await?.unwrap_err();
    assert!(!ConnectionClosed::is(&err));
    assert!(err.to_string().contains("Deserialization"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_oversized_frame_fails_session() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tcp_session(listener).await?;

    let mut stream = TcpStream::connect(addr).await?;
    raw_handshake(&mut stream).await?;
    stream.write_all(&u32::MAX.to_be_bytes()).await?;

    let err = server.await?.unwrap_err();
    assert!(err.to_string().contains("too large"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clean_disconnect_ends_session() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tcp_session(listener).await?;

    let mut stream = TcpStream::connect(addr).await?;
    raw_handshake(&mut stream).await?;
    drop(stream);

    server.await??;
    Ok(())
}
