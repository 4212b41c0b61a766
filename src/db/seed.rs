// src/db/seed.rs

// Dados de exemplo do console (SEED_DEMO_DATA=true).

use rust_decimal::Decimal;

use crate::models::{
    call_center::{Agent, ProfileRef},
    nichos::Category,
    perfiles::{Location, Profile},
    tecnicos::Technician,
};
use crate::db::entity_store::RecordId;

pub fn categories() -> Vec<Category> {
    [
        "Restaurantes",
        "Hoteles",
        "Clínicas Dentales",
        "Gimnasios",
        "Talleres Mecánicos",
        "Inmobiliarias",
        "Peluquerías y Salones de Belleza",
    ]
    .into_iter()
    .zip(1..)
    .map(|(name, id)| Category { id, name: name.to_string() })
    .collect()
}

pub fn technicians() -> Vec<Technician> {
    vec![Technician {
        id: 1,
        name: "Juan Pérez".to_string(),
        phone: "+34 611234567".to_string(),
        email: "juan@example.com".to_string(),
        nichos: vec![1, 2],
        commission: Decimal::from(25),
    }]
}

pub fn agents() -> Vec<Agent> {
    vec![Agent {
        id: 1,
        name: "Carlos López".to_string(),
        phone: "+34 611234567".to_string(),
        email: "carlos@example.com".to_string(),
        nichos: vec![1, 2],
        commission: Decimal::from(20),
        gmb_profiles: vec![
            ProfileRef { location_id: 1, profile_id: 1 },
            ProfileRef { location_id: 1, profile_id: 2 },
        ],
    }]
}

pub fn locations() -> Vec<Location> {
    ["Madrid", "Barcelona", "Valencia"]
        .into_iter()
        .zip(1..)
        .map(|(name, id)| Location { id, name: name.to_string() })
        .collect()
}

pub fn profiles() -> Vec<(RecordId, Vec<Profile>)> {
    vec![
        (
            1,
            vec![
                profile(1, "Taller Centro", "https://g.page/example1", "+34 911234567", "Juan Pérez", 25),
                profile(2, "Taller Norte", "https://g.page/example2", "+34 911234568", "Ana García", 30),
            ],
        ),
        (
            2,
            vec![profile(1, "Taller Eixample", "https://g.page/example3", "+34 931234567", "Marc Vila", 28)],
        ),
    ]
}

fn profile(
    id: RecordId,
    name: &str,
    url: &str,
    phone: &str,
    technician: &str,
    price_per_call: i64,
) -> Profile {
    Profile {
        id,
        name: name.to_string(),
        url: url.to_string(),
        phone: phone.to_string(),
        technician: technician.to_string(),
        price_per_call: Decimal::from(price_per_call),
    }
}
