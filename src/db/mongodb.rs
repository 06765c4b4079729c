use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use std::env;

use crate::api::AppError;
use crate::core::{EstadoReserva, GridBounds, Intervalo, MesaVista, Region, ReservaVista, Slot};

pub type Result<T> = std::result::Result<T, AppError>;

/// Estado operativo de un restaurante.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum EstadoRestaurante {
    #[serde(rename = "inactivo")]
    Inactivo,
    #[serde(rename = "activo")]
    Activo,
    #[serde(rename = "mantenimiento")]
    Mantenimiento,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Restaurante {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<mongodb::bson::oid::ObjectId>,
    pub nombre: String,
    pub password: String,
    pub access_token: String,
    /// Dimensiones de la cuadrícula del plano, fijas desde el registro.
    pub max_x: i32,
    pub max_y: i32,
    pub estado: EstadoRestaurante,
    pub created_at: i64, // timestamp unix
}

impl Restaurante {
    pub fn plano(&self) -> GridBounds {
        GridBounds { max_x: self.max_x, max_y: self.max_y }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Mesa {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<mongodb::bson::oid::ObjectId>,
    pub id_restaurante: mongodb::bson::oid::ObjectId,
    /// Número de mesa, único por restaurante e inmutable tras el alta.
    pub numero: i32,
    pub capacidad: i32,
    pub region: Region,
    /// Bandera manual del operador, independiente de las reservas.
    pub disponible: bool,
    pub created_at: i64, // timestamp unix
}

impl Mesa {
    /// Instantánea de la mesa para la consulta de disponibilidad del núcleo.
    pub fn vista(&self) -> Result<MesaVista> {
        Ok(MesaVista {
            id: self
                .id
                .ok_or_else(|| AppError::Internal("Mesa sin _id".to_string()))?,
            id_restaurante: self.id_restaurante,
            disponible: self.disponible,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Reserva {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<mongodb::bson::oid::ObjectId>,
    pub id_restaurante: mongodb::bson::oid::ObjectId,
    pub id_mesa: mongodb::bson::oid::ObjectId,
    pub nombre_cliente: String,
    pub email_cliente: String,
    pub telefono_cliente: String,
    pub numero_personas: i32,
    /// Fecha de la reserva en formato YYYY-MM-DD.
    pub fecha: String,
    pub hora_inicio: Slot,
    pub hora_fin: Slot,
    pub estado: EstadoReserva,
    pub created_at: i64, // timestamp unix
    pub updated_at: i64, // timestamp unix
}

impl Reserva {
    /// Instantánea de la reserva para el resolutor de conflictos.
    ///
    /// Un documento con fecha no parseable o intervalo invertido no pudo
    /// pasar la validación de alta, así que aquí es un error interno.
    pub fn vista(&self) -> Result<ReservaVista> {
        let id = self
            .id
            .ok_or_else(|| AppError::Internal("Reserva sin _id".to_string()))?;

        let fecha = chrono::NaiveDate::parse_from_str(&self.fecha, "%Y-%m-%d")
            .map_err(|e| AppError::Internal(format!("Fecha corrupta en reserva: {}", e)))?;

        let intervalo = Intervalo::new(self.hora_inicio, self.hora_fin)
            .map_err(|e| AppError::Internal(format!("Intervalo corrupto en reserva: {}", e)))?;

        Ok(ReservaVista { id, id_mesa: self.id_mesa, fecha, intervalo, estado: self.estado })
    }
}

#[derive(Debug, Clone)]
pub struct MongoRepo {
    pub client: Client,
    pub database: Database,
}

impl MongoRepo {
    pub async fn init() -> Result<MongoRepo> {
        let mongo_uri = env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let client = Client::with_uri_str(&mongo_uri)
            .await
            .map_err(|e| AppError::Internal(format!("Error conectando a MongoDB: {}", e)))?;

        let database_name = env::var("MONGODB_DATABASE")
            .unwrap_or_else(|_| "plano_reservas".to_string());

        let database = client.database(&database_name);

        // Test connection
        database
            .run_command(mongodb::bson::doc! {"ping": 1})
            .await
            .map_err(|e| AppError::Internal(format!("Error validando conexión MongoDB: {}", e)))?;

        tracing::info!("Conexión a MongoDB establecida exitosamente");

        Ok(MongoRepo { client, database })
    }

    pub fn restaurantes(&self) -> Collection<Restaurante> {
        self.database.collection("restaurantes")
    }

    pub fn mesas(&self) -> Collection<Mesa> {
        self.database.collection("mesas")
    }

    pub fn reservas(&self) -> Collection<Reserva> {
        self.database.collection("reservas")
    }

    // Método para crear índices si es necesario
    pub async fn create_indexes(&self) -> Result<()> {
        use mongodb::bson::doc;
        use mongodb::{options::IndexOptions, IndexModel};

        // Índices para restaurantes
        let restaurantes = self.restaurantes();
        let restaurante_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "nombre": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "access_token": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        ];

        restaurantes
            .create_indexes(restaurante_indexes)
            .await
            .map_err(|e| AppError::Internal(format!("Error creando índices: {}", e)))?;

        // Índices para mesas: el número es único dentro de cada restaurante
        let mesas = self.mesas();
        let mesa_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "id_restaurante": 1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "id_restaurante": 1, "numero": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        ];

        mesas
            .create_indexes(mesa_indexes)
            .await
            .map_err(|e| AppError::Internal(format!("Error creando índices mesas: {}", e)))?;

        // Índices para reservas. El conflicto de horario se resuelve por
        // solape de intervalos en el núcleo, no por unicidad exacta de
        // (mesa, fecha, hora); aquí solo se indexan las búsquedas.
        let reservas = self.reservas();
        let reservation_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "id_restaurante": 1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "id_mesa": 1, "fecha": 1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "estado": 1 })
                .build(),
        ];

        reservas
            .create_indexes(reservation_indexes)
            .await
            .map_err(|e| AppError::Internal(format!("Error creando índices reservas: {}", e)))?;

        tracing::info!("Índices MongoDB creados exitosamente");
        Ok(())
    }

    // Función auxiliar para obtener timestamp actual
    pub fn current_timestamp() -> i64 {
        chrono::Utc::now().timestamp()
    }
}
