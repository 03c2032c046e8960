use super::*;

#[test]
fn test_single_process_is_the_whole_world() {
    let comm = SingleProcess;
    assert_eq!(comm.rank(), 0);
    assert_eq!(comm.size(), 1);
    comm.barrier();
}
