//! kafkamock - standalone mock broker
//!
//! Runs the mock on a port until interrupted, optionally pre-creating a
//! partition and seeding records, so real CLI consumers can be pointed at
//! it for manual poking.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use tracing::info;

use kafkamock::KafkaMock;

#[derive(Parser)]
#[command(name = "kafkamock")]
#[command(version, about = "In-process Kafka broker mock", long_about = None)]
struct Cli {
    /// TCP port to listen on
    #[arg(short, long, default_value_t = 9092, env = "KAFKAMOCK_PORT")]
    port: u16,

    /// Topic to pre-create
    #[arg(short, long, default_value = "topic-a")]
    topic: String,

    /// Partition index to pre-create
    #[arg(long, default_value_t = 2)]
    partition: i32,

    /// Seed this many records into the topic at startup
    #[arg(short, long, default_value_t = 0)]
    seed: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kafkamock=info".parse()?),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let mock = KafkaMock::new(cli.port);
    mock.create_partition_topics(&[cli.topic.as_str()], cli.partition);
    for n in 0..cli.seed {
        mock.simple_post(
            &cli.topic,
            cli.partition,
            None,
            format!("seed record {n}").as_bytes(),
        );
    }
    if cli.seed > 0 {
        info!("seeded {} records into {}/{}", cli.seed, cli.topic, cli.partition);
    }

    mock.start().await?;

    tokio::signal::ctrl_c().await.ok();
    info!("shutdown signal received");

    mock.request_stop();
    mock.wait_for_termination().await;
    Ok(())
}
