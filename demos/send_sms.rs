use std::io;

use chrono::{Local, TimeDelta};
use log::info;
use phps_sms::{Credentials, PhpsClient, SendOptions, SenderIp, SenderPhone};

fn required_var(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let credentials = Credentials::new(
        required_var("PHPS_ADMIN_USER")?,
        required_var("PHPS_AUTH_KEY")?,
    )?;
    let sender = SenderPhone::new(required_var("PHPS_SENDER")?)?;
    let phone = required_var("PHPS_PHONE")?;
    let message = std::env::var("PHPS_MESSAGE")
        .unwrap_or_else(|_| "phps-sms 예제에서 보낸 메시지입니다.".to_owned());

    let mut builder = PhpsClient::builder(credentials, sender);
    if let Ok(ip) = std::env::var("PHPS_SENDER_IP") {
        builder = builder.sender_ip(SenderIp::new(ip)?);
    }
    let mut client = builder.build().await?;

    let queued = client.add(&phone, &message, true)?;
    info!("queued {queued} message(s) for {phone}");

    let mut options = SendOptions::default().comment("phps-sms demo");
    if let Ok(minutes) = std::env::var("PHPS_DELAY_MINUTES") {
        let minutes: i64 = minutes.trim().parse()?;
        options = options.scheduled_at(Local::now() + TimeDelta::minutes(minutes));
    }

    for (index, response) in client.send(options).await?.iter().enumerate() {
        println!("response #{}: {:?}", index + 1, response.entries());
    }

    Ok(())
}
