mod check_in;
mod client;
mod magic_link;
mod notification;
mod personnel;
mod status;
mod task;
mod user;
mod work_order;
