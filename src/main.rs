fn main() {
    pssm_field::run();
}
