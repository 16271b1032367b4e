use {
    crate::{
        acceptor::{Acceptor, AcceptorError},
        cli::VirtwlArgs,
        client::run_client,
        clientmem::{self, ClientMemError},
        config::{Config, ConfigError},
        logger::Logger,
        renderer::{Renderer, RendererError},
        scene::FrameClock,
        sighand::{SighandError, SignalWatcher},
        utils::{errorfmt::ErrorFmt, shutdown::ShutdownToken},
    },
    log::Level,
    std::{
        io,
        sync::Arc,
        thread::{self, Scope},
        time::Instant,
    },
    thiserror::Error,
};

const SIGNAL_POLL_MS: i32 = 100;

#[derive(Debug, Error)]
enum CompositorError {
    #[error("Could not load the configuration")]
    ConfigError(#[from] ConfigError),
    #[error("Could not install the signal handler")]
    SighandError(#[from] SighandError),
    #[error("Could not initialize the client memory module")]
    ClientMemError(#[from] ClientMemError),
    #[error("Could not create the wayland socket")]
    AcceptorError(#[from] AcceptorError),
    #[error("Could not create the renderer")]
    RendererError(#[from] RendererError),
    #[error("Could not spawn the {0} thread")]
    SpawnThread(&'static str, #[source] io::Error),
    #[error("The frame thread panicked")]
    FramePanicked,
}

pub fn start_compositor(args: VirtwlArgs) {
    let logger = Logger::install_stderr(Level::Info);
    log::info!("virtwl {}", env!("CARGO_PKG_VERSION"));
    logger.set_level(args.log_level.into());
    if let Err(e) = main_(&args) {
        fatal!("A fatal error occurred: {}", ErrorFmt(e));
    }
}

fn main_(args: &VirtwlArgs) -> Result<(), CompositorError> {
    let config = Arc::new(Config::from_args(args)?);
    let signals = SignalWatcher::install()?;
    clientmem::init()?;
    let shutdown = ShutdownToken::default();
    let acceptor = Acceptor::install(&config, &shutdown)?;
    log::info!("Listening on {}", acceptor.socket_path());
    let renderer = Renderer::new(&config)?;
    let clock = Arc::new(FrameClock::default());
    let renderer = thread::scope(|s| -> Result<Renderer, CompositorError> {
        let res = spawn_workers(s, &config, &acceptor, &clock, &shutdown, renderer);
        let frame = match res {
            Ok(frame) => frame,
            Err(e) => {
                shutdown.trigger();
                acceptor.close();
                return Err(e);
            }
        };
        while !shutdown.is_triggered() {
            match signals.wait(SIGNAL_POLL_MS) {
                Ok(true) => {
                    log::info!("Exiting");
                    shutdown.trigger();
                }
                Ok(false) => {}
                Err(e) => {
                    log::error!("{}", ErrorFmt(e));
                    shutdown.trigger();
                }
            }
        }
        log::info!("Closing {} connections", acceptor.num_connections());
        acceptor.close();
        frame.join().map_err(|_| CompositorError::FramePanicked)
    })?;
    if let Some(path) = &config.dump_frame {
        match renderer.dump_png(path) {
            Ok(()) => log::info!("Wrote the last frame to {}", path),
            Err(e) => log::error!("{}", ErrorFmt(e)),
        }
    }
    Ok(())
}

fn spawn_workers<'scope, 'env>(
    s: &'scope Scope<'scope, 'env>,
    config: &'env Arc<Config>,
    acceptor: &'env Arc<Acceptor>,
    clock: &'env Arc<FrameClock>,
    shutdown: &'env ShutdownToken,
    mut renderer: Renderer,
) -> Result<thread::ScopedJoinHandle<'scope, Renderer>, CompositorError> {
    thread::Builder::new()
        .name("closer".to_string())
        .spawn_scoped(s, move || acceptor.close_loop())
        .map_err(|e| CompositorError::SpawnThread("closer", e))?;
    thread::Builder::new()
        .name("acceptor".to_string())
        .spawn_scoped(s, move || {
            acceptor.accept_loop(|conn| {
                let id = conn.id;
                let config = config.clone();
                let acceptor2 = acceptor.clone();
                let clock = clock.clone();
                let shutdown = shutdown.clone();
                let res = thread::Builder::new()
                    .name(format!("client-{}", id))
                    .spawn_scoped(s, move || run_client(conn, config, acceptor2, clock, shutdown));
                if let Err(e) = res {
                    log::error!("Could not spawn a thread for client {}: {}", id, ErrorFmt(e));
                    acceptor.request_close(id);
                }
            })
        })
        .map_err(|e| CompositorError::SpawnThread("acceptor", e))?;
    thread::Builder::new()
        .name("frame".to_string())
        .spawn_scoped(s, move || {
            frame_loop(&mut renderer, acceptor, clock, config, shutdown);
            renderer
        })
        .map_err(|e| CompositorError::SpawnThread("frame", e))
}

/// Composites all scenes once per frame interval.
fn frame_loop(
    renderer: &mut Renderer,
    acceptor: &Acceptor,
    clock: &FrameClock,
    config: &Config,
    shutdown: &ShutdownToken,
) {
    let mut next = Instant::now();
    while !shutdown.is_triggered() {
        let scenes = acceptor.scenes();
        let drawn = renderer.render(&scenes);
        let seq = clock.tick();
        log::trace!("Frame {}: {} surfaces", seq, drawn);
        next += config.frame_interval;
        let now = Instant::now();
        match next.checked_duration_since(now) {
            Some(wait) => thread::sleep(wait),
            None => next = now,
        }
    }
}
