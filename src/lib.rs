// Biblioteca raíz del crate `carbon_dashboard`.
// Servicio HTTP/JSON que expone los indicadores de emisiones de la planta
// a partir de los libros Excel e informes de texto del directorio de datos.
pub mod algorithm;
pub mod api_json;
pub mod config;
pub mod error;
pub mod excel;
pub mod report;
pub mod server;
pub mod server_handlers;

/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;
