mod reservation;

pub use reservation::ReservationData;
