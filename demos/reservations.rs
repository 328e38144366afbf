use std::io;

use phps_sms::{Credentials, PhpsClient, ReservationId, SenderIp, SenderPhone};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let var = |name: &str| {
        std::env::var(name).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{name} environment variable is required"),
            )
        })
    };

    let credentials = Credentials::new(var("PHPS_ADMIN_USER")?, var("PHPS_AUTH_KEY")?)?;
    let sender = SenderPhone::new(var("PHPS_SENDER")?)?;
    // Reservation calls don't use the sender IP, so skip discovery.
    let client = PhpsClient::new(credentials, sender, SenderIp::new("0.0.0.0")?);

    match std::env::args().nth(1) {
        Some(tr_num) => {
            let reservation = ReservationId::new(tr_num.trim().parse()?);
            let response = client.cancel(reservation).await?;
            println!("cancel {}: {:?}", reservation.value(), response.entries());
        }
        None => {
            let response = client.view_pending().await?;
            for (key, value) in response.entries() {
                println!("{key:?} = {value:?}");
            }
        }
    }

    Ok(())
}
