use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use tally_types::models::{Operation, Period, PointEvent, User, UserStats};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{Database, LedgerError};

/// Length of the public code handed out in personal links.
pub const CODE_LEN: usize = 10;

#[derive(Debug, Clone)]
pub struct Registration {
    pub codigo_usuario: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Adjustment {
    pub puntos: u64,
    pub message: String,
}

impl Database {
    // -- Users --

    pub fn register_user(&self, name: &str) -> Result<Registration, LedgerError> {
        let nombre = name.trim().to_string();
        if nombre.is_empty() {
            return Err(LedgerError::EmptyName);
        }

        let mut snapshot = self.load()?;

        let lowered = nombre.to_lowercase();
        if snapshot.usuarios.iter().any(|u| u.nombre.to_lowercase() == lowered) {
            warn!("Rejected duplicate user name '{}'", nombre);
            return Err(LedgerError::DuplicateName);
        }

        let codigo = fresh_code(&snapshot.usuarios);
        let now = Utc::now();
        snapshot.usuarios.push(User {
            id: Uuid::new_v4().to_string(),
            nombre: nombre.clone(),
            codigo_usuario: codigo.clone(),
            puntos: 0,
            fecha_registro: now,
            fecha_actualizacion: now,
        });

        if !self.save(&mut snapshot) {
            return Err(LedgerError::SaveFailed);
        }

        info!("Registered user '{}' ({})", nombre, codigo);
        Ok(Registration {
            message: format!("User {} registered successfully", nombre),
            codigo_usuario: codigo,
        })
    }

    pub fn get_user_by_code(&self, code: &str) -> Result<Option<User>, LedgerError> {
        let snapshot = self.load()?;
        Ok(snapshot.usuarios.into_iter().find(|u| u.codigo_usuario == code))
    }

    // -- Points --

    /// Decrementing at zero leaves the total alone but still records the
    /// event and still succeeds.
    pub fn adjust_points(&self, code: &str, op: Operation) -> Result<Adjustment, LedgerError> {
        let mut snapshot = self.load()?;

        let user = snapshot
            .usuarios
            .iter_mut()
            .find(|u| u.codigo_usuario == code)
            .ok_or(LedgerError::UserNotFound)?;

        match op {
            Operation::Suma => user.puntos += 1,
            Operation::Resta => user.puntos = user.puntos.saturating_sub(1),
        }

        let now = Utc::now();
        user.fecha_actualizacion = now;
        let puntos = user.puntos;
        let event = PointEvent {
            id: Uuid::new_v4().to_string(),
            usuario_id: user.id.clone(),
            codigo_usuario: code.to_string(),
            tipo: op,
            fecha: now,
        };
        snapshot.ordenes.push(event);

        if !self.save(&mut snapshot) {
            return Err(LedgerError::SaveFailed);
        }

        debug!("{:?} on {} -> {} points", op, code, puntos);
        let message = match op {
            Operation::Suma => "Points added",
            Operation::Resta => "Points subtracted",
        };
        Ok(Adjustment {
            puntos,
            message: message.to_string(),
        })
    }

    // -- Leaderboard --

    /// All users by points, highest first. Ties keep registration order.
    pub fn get_leaderboard(&self) -> Result<Vec<User>, LedgerError> {
        let mut users = self.load()?.usuarios;
        // `sort_by` is stable, which is what keeps tied users in place.
        users.sort_by(|a, b| b.puntos.cmp(&a.puntos));
        Ok(users)
    }

    /// Period filtering is not implemented; every period yields the lifetime
    /// ranking.
    pub fn get_leaderboard_for_period(&self, period: Period) -> Result<Vec<User>, LedgerError> {
        debug!("Leaderboard requested for {:?}", period);
        self.get_leaderboard()
    }

    pub fn get_user_stats(&self, code: &str) -> Result<Option<UserStats>, LedgerError> {
        let snapshot = self.load()?;

        let Some(user) = snapshot.usuarios.iter().find(|u| u.codigo_usuario == code) else {
            return Ok(None);
        };

        let total = snapshot
            .ordenes
            .iter()
            .filter(|o| o.codigo_usuario == code)
            .count() as u64;

        Ok(Some(UserStats {
            nombre: user.nombre.clone(),
            puntos: user.puntos,
            ordenes_hoy: user.puntos,
            ordenes_semana: user.puntos,
            ordenes_mes: user.puntos,
            ordenes_total: total,
        }))
    }
}

pub fn generate_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

fn fresh_code(users: &[User]) -> String {
    loop {
        let code = generate_code();
        if !users.iter().any(|u| u.codigo_usuario == code) {
            return code;
        }
    }
}
