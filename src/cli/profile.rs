use crate::{auth::AuthService, cli::fetch_spinner, error, info, spotify};

/// Fetches and prints the authenticated user's profile.
pub async fn profile(service: &AuthService) {
    let pb = fetch_spinner("Fetching user profile...");
    let result = spotify::user::current_user_profile(service).await;
    pb.finish_and_clear();

    let profile = match result {
        Ok(profile) => profile,
        Err(e) => error!("Failed to fetch user profile: {}", e),
    };

    info!("User ID:   {}", profile.id);
    info!(
        "Name:      {}",
        profile.display_name.as_deref().unwrap_or("-")
    );
    info!("Country:   {}", profile.country.as_deref().unwrap_or("-"));
    info!("Product:   {}", profile.product.as_deref().unwrap_or("-"));
    if let Some(followers) = profile.followers {
        info!("Followers: {}", followers.total);
    }
}
