mod auth;
mod helpers;
mod pipeline;
mod site;
mod upload;
