use portfolio_domain::identity::Identity;

#[derive(clap::Parser)]
pub struct Config {
    /// Postgres connection string.
    #[clap(long, env)]
    pub database_url: String,

    #[clap(long, env)]
    pub jwt_signing_key: JwtSigningKey,

    /// Email of the site owner, who administers the diary, mailbox and gallery.
    #[clap(long, env)]
    pub site_owner_email: Identity,

    #[clap(long, env, default_value = "0.0.0.0:8080")]
    pub bind_address: String,
}

#[derive(Clone)]
pub struct JwtSigningKey(pub hmac::Hmac<sha2::Sha384>);

impl std::str::FromStr for JwtSigningKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use hmac::Mac;

        Ok(Self(
            hmac::Hmac::<sha2::Sha384>::new_from_slice(s.as_bytes())
                .map_err(|e| format!("Failed to parse hmac: {e:?}"))?,
        ))
    }
}
