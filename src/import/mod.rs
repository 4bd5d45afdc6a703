pub mod postman;
