use super::{
    models, password, schema, ReservationFilter, ReservationId, RoomId, RoomReservationStore,
    RoomReservationStoreFacade, StoreError, UserId,
};
use crate::auth_session::SessionToken;
use crate::availability;
use crate::data_store::auth_token::{AccessRole, AuthToken, Privilege};
use diesel::expression::AsExpression;
use diesel::pg::PgConnection;
use diesel::prelude::*;

#[derive(Clone)]
pub struct PgDataStore {
    pool: diesel::r2d2::Pool<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStore {
    pub fn new(database_url: &str) -> Result<Self, StoreError> {
        let connection_manager = diesel::r2d2::ConnectionManager::<PgConnection>::new(database_url);
        Ok(Self {
            pool: diesel::r2d2::Pool::builder()
                .test_on_check_out(true)
                .min_idle(Some(2))
                .build(connection_manager)?,
        })
    }
}

impl RoomReservationStore for PgDataStore {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn RoomReservationStoreFacade + 'a>, StoreError> {
        Ok(Box::new(PgDataStoreFacade::with_pooled_connection(
            self.pool.get()?,
        )))
    }
}

pub struct PgDataStoreFacade {
    connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStoreFacade {
    pub fn with_pooled_connection(
        connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
    ) -> Self {
        Self { connection }
    }
}

impl RoomReservationStoreFacade for PgDataStoreFacade {
    fn get_rooms(&mut self, auth_token: &AuthToken) -> Result<Vec<models::Room>, StoreError> {
        use schema::rooms::dsl::*;
        auth_token.check_privilege(Privilege::ShowRooms)?;

        Ok(rooms
            .select(models::Room::as_select())
            .order_by(id)
            .load::<models::Room>(&mut self.connection)?)
    }

    fn get_room(
        &mut self,
        auth_token: &AuthToken,
        room_id: RoomId,
    ) -> Result<models::Room, StoreError> {
        use schema::rooms::dsl::*;
        auth_token.check_privilege(Privilege::ShowRooms)?;

        Ok(rooms
            .filter(id.eq(room_id))
            .select(models::Room::as_select())
            .first::<models::Room>(&mut self.connection)?)
    }

    fn get_reservations_filtered(
        &mut self,
        auth_token: &AuthToken,
        filter: ReservationFilter,
    ) -> Result<Vec<models::Reservation>, StoreError> {
        use schema::reservations::dsl::*;
        auth_token.check_privilege(Privilege::ShowReservations)?;

        Ok(reservations
            .filter(reservation_filter_to_sql(filter))
            .order_by((start_time.asc(), end_time.asc(), id.asc()))
            .select(models::Reservation::as_select())
            .load::<models::Reservation>(&mut self.connection)?)
    }

    fn get_reservation(
        &mut self,
        auth_token: &AuthToken,
        reservation_id: ReservationId,
    ) -> Result<models::Reservation, StoreError> {
        use schema::reservations::dsl::*;
        auth_token.check_privilege(Privilege::ShowReservations)?;

        Ok(reservations
            .filter(id.eq(reservation_id))
            .select(models::Reservation::as_select())
            .first::<models::Reservation>(&mut self.connection)?)
    }

    fn create_reservation(
        &mut self,
        auth_token: &AuthToken,
        reservation: models::NewReservation,
    ) -> Result<models::Reservation, StoreError> {
        use schema::reservations::dsl::*;
        auth_token.check_privilege(Privilege::ManageReservations)?;
        reservation.validate()?;

        // The availability check and the insert must be serializable. Otherwise, two concurrent
        // transactions could both see the room as free and insert overlapping reservations.
        self.connection
            .build_transaction()
            .serializable()
            .run(|connection| {
                ensure_room_exists(reservation.room_id, connection)?;
                check_availability(
                    reservation.room_id,
                    &reservation.start_time,
                    &reservation.end_time,
                    None,
                    connection,
                )?;

                Ok(diesel::insert_into(reservations)
                    .values(&reservation)
                    .returning(models::Reservation::as_returning())
                    .get_result::<models::Reservation>(connection)?)
            })
    }

    fn update_reservation(
        &mut self,
        auth_token: &AuthToken,
        reservation_id: ReservationId,
        patch: models::ReservationPatch,
    ) -> Result<models::Reservation, StoreError> {
        use schema::reservations::dsl::*;
        auth_token.check_privilege(Privilege::ManageReservations)?;

        self.connection
            .build_transaction()
            .serializable()
            .run(|connection| {
                let current = reservations
                    .filter(id.eq(reservation_id))
                    .select(models::Reservation::as_select())
                    .first::<models::Reservation>(connection)?;
                if patch.is_empty() {
                    return Ok(current);
                }

                let updated = patch.apply_to(&current);
                models::validate_time_range(&updated.start_time, &updated.end_time)?;
                if updated.room_id != current.room_id {
                    ensure_room_exists(updated.room_id, connection)?;
                }
                check_availability(
                    updated.room_id,
                    &updated.start_time,
                    &updated.end_time,
                    Some(reservation_id),
                    connection,
                )?;

                Ok(diesel::update(reservations)
                    .filter(id.eq(reservation_id))
                    .set(&patch)
                    .returning(models::Reservation::as_returning())
                    .get_result::<models::Reservation>(connection)?)
            })
    }

    fn delete_reservation(
        &mut self,
        auth_token: &AuthToken,
        reservation_id: ReservationId,
    ) -> Result<(), StoreError> {
        use schema::reservations::dsl::*;
        auth_token.check_privilege(Privilege::ManageReservations)?;

        let count = diesel::delete(reservations.filter(id.eq(reservation_id)))
            .execute(&mut self.connection)?;
        if count == 0 {
            return Err(StoreError::NotExisting);
        }
        Ok(())
    }

    fn register_user(&mut self, the_email: &str, the_password: &str) -> Result<UserId, StoreError> {
        insert_user(the_email, the_password, AccessRole::User, &mut self.connection)
    }

    fn create_user(
        &mut self,
        auth_token: &AuthToken,
        the_email: &str,
        the_password: &str,
        the_role: AccessRole,
    ) -> Result<UserId, StoreError> {
        auth_token.check_privilege(Privilege::ManageUsers)?;
        insert_user(the_email, the_password, the_role, &mut self.connection)
    }

    fn get_users(&mut self, auth_token: &AuthToken) -> Result<Vec<models::User>, StoreError> {
        use schema::users::dsl::*;
        auth_token.check_privilege(Privilege::ManageUsers)?;

        Ok(users
            .select(models::User::as_select())
            .order_by(id)
            .load::<models::User>(&mut self.connection)?)
    }

    fn set_user_role(
        &mut self,
        auth_token: &AuthToken,
        the_email: &str,
        the_role: AccessRole,
    ) -> Result<(), StoreError> {
        use schema::users::dsl::*;
        auth_token.check_privilege(Privilege::ManageUsers)?;

        let count = diesel::update(users)
            .filter(email.eq(the_email))
            .set(role.eq(the_role))
            .execute(&mut self.connection)?;
        if count == 0 {
            return Err(StoreError::NotExisting);
        }
        Ok(())
    }

    fn authenticate_with_password(
        &mut self,
        the_email: &str,
        the_password: &str,
    ) -> Result<models::User, StoreError> {
        use schema::users::dsl::*;

        let Some(user) = users
            .filter(email.eq(the_email))
            .select(models::User::as_select())
            .first::<models::User>(&mut self.connection)
            .optional()?
        else {
            password::verify_password_of_unknown_user(the_password);
            return Err(StoreError::NotExisting);
        };
        if password::verify_password(the_password, &user.password_hash) {
            Ok(user)
        } else {
            Err(StoreError::NotExisting)
        }
    }

    fn get_auth_token_for_session(
        &mut self,
        session_token: &SessionToken,
    ) -> Result<AuthToken, StoreError> {
        use schema::users::dsl::*;

        let the_role = users
            .filter(id.eq(session_token.user_id()))
            .select(role)
            .first::<AccessRole>(&mut self.connection)?;

        Ok(AuthToken::create_for_session(
            session_token.user_id(),
            the_role,
        ))
    }
}

fn ensure_room_exists(room_id: RoomId, connection: &mut PgConnection) -> Result<(), StoreError> {
    use diesel::dsl::exists;
    let room_exists = diesel::select(exists(
        schema::rooms::table.filter(schema::rooms::id.eq(room_id)),
    ))
    .get_result::<bool>(connection)?;
    if room_exists {
        Ok(())
    } else {
        Err(StoreError::InvalidInputData(format!(
            "Room {} does not exist.",
            room_id
        )))
    }
}

/// Load the reservations of the room which may overlap with the requested interval and check them
/// with the availability checker.
fn check_availability(
    the_room_id: RoomId,
    start: &chrono::DateTime<chrono::Utc>,
    end: &chrono::DateTime<chrono::Utc>,
    exclude_reservation_id: Option<ReservationId>,
    connection: &mut PgConnection,
) -> Result<(), StoreError> {
    use schema::reservations::dsl::*;

    let candidates = reservations
        .filter(room_id.eq(the_room_id))
        .filter(end_time.ge(*start))
        .filter(start_time.le(*end))
        .select(models::Reservation::as_select())
        .load::<models::Reservation>(connection)?;

    if availability::is_room_available(
        the_room_id,
        start,
        end,
        &candidates,
        exclude_reservation_id,
    ) {
        return Ok(());
    }
    let conflicting = availability::find_conflicting_reservations(
        the_room_id,
        start,
        end,
        &candidates,
        exclude_reservation_id,
    );
    Err(StoreError::ReservationConflict {
        conflicting: conflicting.iter().map(|r| r.id).collect(),
    })
}

fn insert_user(
    the_email: &str,
    the_password: &str,
    the_role: AccessRole,
    connection: &mut PgConnection,
) -> Result<UserId, StoreError> {
    use schema::users::dsl::*;

    models::validate_user_credentials(the_email, the_password)?;
    let new_user = models::NewUser {
        email: the_email.to_owned(),
        password_hash: password::hash_password(the_password)?,
        role: the_role,
    };
    Ok(diesel::insert_into(users)
        .values(&new_user)
        .returning(id)
        .get_result::<UserId>(connection)?)
}

type BoxedBoolExpression<'a, T> = Box<
    dyn BoxableExpression<T, diesel::pg::Pg, SqlType = diesel::sql_types::Bool> + 'a,
>;

fn reservation_filter_to_sql<'a>(
    filter: ReservationFilter,
) -> BoxedBoolExpression<'a, schema::reservations::table> {
    use schema::reservations::dsl::*;

    let mut expression: BoxedBoolExpression<'a, schema::reservations::table> =
        Box::new(diesel::dsl::sql::<diesel::sql_types::Bool>("TRUE"));
    if let Some(the_room_id) = filter.room_id {
        expression = Box::new(expression.as_expression().and(room_id.eq(the_room_id)));
    }
    if let Some(after) = filter.after {
        expression = Box::new(expression.as_expression().and(end_time.gt(after)));
    }
    if let Some(before) = filter.before {
        expression = Box::new(expression.as_expression().and(start_time.lt(before)));
    }
    expression
}

/// Get a human-readable description of the consistency expectation that is checked by a specific
/// constraint in our Postgres database schema by the constraint's name.
///
/// These are visible to the user when creating or updating entities inconsistently via the REST
/// API.
///
/// Returns None, when no human-readable description is present of the given constraint name. This
/// may be the case when we don't expect this constraint to be violated by a user interaction.
pub fn description_for_postgres_constraint(constraint_name: &str) -> Option<&'static str> {
    match constraint_name {
        "reservations_room_id_fkey" => Some("Reservation's room must reference an existing room."),
        "reservations_time_range" => {
            Some("Reservation's start time must be earlier than its end time.")
        }
        "rooms_capacity_positive" => Some("Room's capacity must be positive."),
        _ => None,
    }
}
