pub mod login_routes;
