pub mod appointments;
pub mod auth;
pub mod profiles;
pub mod projects;
pub mod social;
pub mod testimonials;
pub mod uploads;

use actix_web::http::Method;
use actix_web::{HttpResponse, web};

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth ──
    cfg.service(web::scope("/auth").route("/me", web::get().to(auth::me)));

    // ── Profiles (literal paths before `/{user_id}`) ──
    cfg.service(
        web::scope("/profiles")
            .route("", web::post().to(profiles::create_profile))
            .route("/me", web::get().to(profiles::get_my_profile))
            .route("/me", web::patch().to(profiles::update_my_profile))
            .route("/businesses", web::get().to(profiles::get_business_profiles))
            .route("/{user_id}", web::get().to(profiles::get_profile)),
    );

    // ── Appointments ──
    cfg.service(
        web::scope("/appointments")
            .route("", web::post().to(appointments::create_appointment))
            .route("/mine", web::get().to(appointments::get_my_appointments))
            .route(
                "/business/{business_id}",
                web::get().to(appointments::get_business_appointments),
            )
            .route("/{id}", web::get().to(appointments::get_appointment))
            .route("/{id}", web::patch().to(appointments::update_appointment))
            .route("/{id}/book", web::post().to(appointments::book_appointment)),
    );

    // ── Projects ──
    cfg.service(
        web::scope("/projects")
            .route("", web::post().to(projects::create_project))
            .route("/mine", web::get().to(projects::get_my_projects))
            .route("/{id}", web::get().to(projects::get_project))
            .route("/{id}", web::patch().to(projects::update_project)),
    );

    // ── Testimonials ──
    cfg.service(
        web::scope("/testimonials")
            .route("", web::post().to(testimonials::create_testimonial))
            .route(
                "/business/{business_id}",
                web::get().to(testimonials::get_business_testimonials),
            )
            .route("/{id}", web::patch().to(testimonials::update_testimonial))
            .route(
                "/{id}/highlight",
                web::post().to(testimonials::toggle_highlight),
            ),
    );

    // ── Upload proxy ──
    cfg.service(
        web::resource("/uploads")
            .route(web::post().to(uploads::proxy_post))
            .route(web::get().to(uploads::proxy_get))
            .route(web::method(Method::OPTIONS).to(uploads::options)),
    );

    // ── Social platform: OAuth + mirrored content ──
    cfg.service(
        web::scope("/social")
            .route("/connect", web::get().to(social::connect))
            .route("/callback", web::get().to(social::callback))
            .route("/callback", web::method(Method::OPTIONS).to(social::callback_options))
            .route("/account", web::get().to(social::get_account))
            .route("/account", web::delete().to(social::disconnect))
            .route("/sync", web::post().to(social::sync_now))
            .route("/posts/{user_id}", web::get().to(social::get_posts)),
    );
}

/// Static CORS headers for the raw HTTP routes. Everything else gets them
/// from the actix-cors middleware.
pub fn preflight(methods: &'static str) -> HttpResponse {
    HttpResponse::NoContent()
        .insert_header(("Access-Control-Allow-Origin", "*"))
        .insert_header(("Access-Control-Allow-Methods", methods))
        .insert_header((
            "Access-Control-Allow-Headers",
            "Authorization, Content-Type, Accept",
        ))
        .insert_header(("Access-Control-Max-Age", "86400"))
        .finish()
}

/// Reject blank required strings.
pub(crate) fn require_text(value: &str, field: &str) -> Result<(), crate::errors::ApiError> {
    if value.trim().is_empty() {
        return Err(crate::errors::ApiError::BadRequest(format!(
            "{field} cannot be empty"
        )));
    }
    Ok(())
}
