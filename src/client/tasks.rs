use {
    crate::{
        acceptor::{Acceptor, Connection},
        client::Client,
        config::Config,
        scene::FrameClock,
        utils::{
            buffd::{BufFdError, BufFdIn, Received},
            errorfmt::ErrorFmt,
            shutdown::ShutdownToken,
        },
    },
    std::sync::Arc,
};

/// Serves one connection until the peer leaves, an I/O error occurs or the server shuts down.
pub fn run_client(
    conn: Arc<Connection>,
    config: Arc<Config>,
    acceptor: Arc<Acceptor>,
    clock: Arc<FrameClock>,
    shutdown: ShutdownToken,
) {
    let id = conn.id;
    let mut client = Client::new(conn.clone(), config.clone());
    if let Err(e) = serve(&mut client, &conn, &config, &clock, &shutdown) {
        match e {
            BufFdError::Closed => log::info!("Client {} hung up", id),
            e => log::error!("Client {}: {}", id, ErrorFmt(e)),
        }
    }
    client.destroy();
    acceptor.request_close(id);
}

fn serve(
    client: &mut Client,
    conn: &Connection,
    config: &Config,
    clock: &FrameClock,
    shutdown: &ShutdownToken,
) -> Result<(), BufFdError> {
    let mut input = BufFdIn::new(conn.fd.clone());
    let mut seen = clock.seq();
    while !shutdown.is_triggered() {
        match input.read(config.read_timeout_ms)? {
            Received::Timeout => {}
            Received::Data { bytes, fds } => client.handle_data(bytes, fds),
            Received::Eof => return Err(BufFdError::Closed),
        }
        let seq = clock.seq();
        if seq != seen {
            seen = seq;
            client.fire_frame_callbacks(clock.now_ms());
        }
        client.flush()?;
    }
    Ok(())
}
