use crate::cmd::Playground;
use crate::config::{NameArgs, SetArgs, SetFieldArgs, SnapshotArgs, parse_json};
use crate::error::PlaygroundError;

pub async fn snapshot(playground: &Playground, args: SnapshotArgs) -> Result<(), PlaygroundError> {
    let value = playground.rx.record(&args.name).snapshot().await?;
    match args.field {
        Some(field) => match client_memory::get_path(&value, &field) {
            Some(v) => println!("{v}"),
            None => println!("null"),
        },
        None => println!("{value}"),
    }
    Ok(())
}

pub async fn exists(playground: &Playground, args: NameArgs) -> Result<(), PlaygroundError> {
    let exists = playground.rx.record(&args.name).exists().await?;
    println!("{exists}");
    Ok(())
}

pub async fn set(playground: &Playground, args: SetArgs) -> Result<(), PlaygroundError> {
    let value = parse_json(&args.value)?;
    let record = playground.rx.record(&args.name);
    record.set(value).await?;
    println!("{}", record.snapshot().await?);
    Ok(())
}

pub async fn set_field(playground: &Playground, args: SetFieldArgs) -> Result<(), PlaygroundError> {
    let value = parse_json(&args.value)?;
    let record = playground.rx.record(&args.name);
    record.set_field(args.path, value).await?;
    println!("{}", record.snapshot().await?);
    Ok(())
}
