use futures::StreamExt;

use crate::cmd::Playground;
use crate::config::{ErrorArgs, WatchArgs};
use crate::error::PlaygroundError;

pub async fn run(playground: &Playground, args: WatchArgs) -> Result<(), PlaygroundError> {
    let mut stream = playground.rx.record(&args.name).get();
    let updates = playground.spawn_updates();
    let mut seen = 0usize;

    let result = loop {
        tokio::select! {
            item = stream.next() => match item {
                Some(Ok(value)) => {
                    println!("{value}");
                    seen += 1;
                    if args.count.is_some_and(|count| seen >= count) {
                        break Ok(());
                    }
                }
                Some(Err(e)) => break Err(e.into()),
                None => break Ok(()),
            },
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    break Err(e.into());
                }
                tracing::info!(record = %args.name, values = seen, "interrupted");
                break Ok(());
            }
        }
    };

    updates.abort();
    result
}

pub async fn run_error(playground: &Playground, args: ErrorArgs) -> Result<(), PlaygroundError> {
    let mut stream = playground.rx.record(&args.name).get();

    match stream.next().await {
        Some(Ok(value)) => println!("{value}"),
        Some(Err(e)) => return Err(e.into()),
        None => return Err(PlaygroundError::EmptyStream(args.name)),
    }

    tracing::info!(code = %args.code, "emitting connection error");
    playground.client.emit_error(args.code, args.message);

    while let Some(item) = stream.next().await {
        match item {
            Ok(value) => println!("{value}"),
            Err(e) => println!("terminated: {e}"),
        }
    }
    tracing::info!(
        error_listeners = playground.client.error_listener_count(),
        subscribers = playground.client.subscriber_count(&args.name),
        "stream closed"
    );
    Ok(())
}
